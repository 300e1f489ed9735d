use async_graphql::{Context, Object, Result, ID};
use tracing::info;

use super::inputs::{
    AddHotelInput, AddRoomInput, BookRoomInput, LeaveReviewInput, LoginInput, RegisterInput,
    SetAvailabilityInput, UpdateHotelInput, UpdateRoomInput,
};
use super::types::AuthPayload;
use super::{ContextExt, ResultExt};
use crate::api::auth;
use crate::db::{Availability, Booking, Hotel, Review, Room};
use crate::engine::{
    approve_booking, cancel_booking, create_booking, leave_review, set_room_availability,
};
use crate::error::Error;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a customer account
    async fn register(&self, ctx: &Context<'_>, input: RegisterInput) -> Result<AuthPayload> {
        let api = ctx.api()?;
        let (token, user) = auth::register(&api.db, &api.tokens, &input.name, &input.email, &input.password)
            .await
            .or_graphql(ctx)?;
        Ok(AuthPayload { token, user })
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let api = ctx.api()?;
        let (token, user) = auth::login(&api.db, &api.tokens, &input.email, &input.password)
            .await
            .or_graphql(ctx)?;
        Ok(AuthPayload { token, user })
    }

    async fn add_hotel(&self, ctx: &Context<'_>, input: AddHotelInput) -> Result<Hotel> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let hotel = input.into_new_hotel().or_graphql(ctx)?;
        let hotel = Hotel::create(&ctx.api()?.db, &hotel)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)?;
        info!(hotel_id = %hotel.id, name = %hotel.name, "Hotel added");
        Ok(hotel)
    }

    async fn update_hotel(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateHotelInput,
    ) -> Result<Hotel> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let changes = input.into_changes().or_graphql(ctx)?;
        Hotel::update(&ctx.api()?.db, &id, &changes)
            .await
            .map_err(Error::from)
            .and_then(|h| h.ok_or_else(|| Error::not_found(format!("Hotel not found: {}", *id))))
            .or_graphql(ctx)
    }

    /// Delete a hotel with its rooms, availability, bookings and reviews
    async fn delete_hotel(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let deleted = Hotel::delete(&ctx.api()?.db, &id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)?;
        if !deleted {
            return Err(Error::not_found(format!("Hotel not found: {}", *id))).or_graphql(ctx);
        }
        info!(hotel_id = %id.as_str(), "Hotel deleted");
        Ok(true)
    }

    async fn add_room(&self, ctx: &Context<'_>, input: AddRoomInput) -> Result<Room> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let room = input.into_new_room().or_graphql(ctx)?;
        let api = ctx.api()?;

        let hotel_exists = Hotel::exists(&api.db, &room.hotel_id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)?;
        if !hotel_exists {
            return Err(Error::not_found(format!("Hotel not found: {}", room.hotel_id)))
                .or_graphql(ctx);
        }

        let room = Room::create(&api.db, &room)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)?;
        info!(room_id = %room.id, hotel_id = %room.hotel_id, "Room added");
        Ok(room)
    }

    async fn update_room(&self, ctx: &Context<'_>, id: ID, input: UpdateRoomInput) -> Result<Room> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let changes = input.into_changes().or_graphql(ctx)?;
        let api = ctx.api()?;

        if let Some(hotel_id) = &changes.hotel_id {
            let hotel_exists = Hotel::exists(&api.db, hotel_id)
                .await
                .map_err(Error::from)
                .or_graphql(ctx)?;
            if !hotel_exists {
                return Err(Error::not_found(format!("Hotel not found: {}", hotel_id)))
                    .or_graphql(ctx);
            }
        }

        Room::update(&api.db, &id, &changes)
            .await
            .map_err(Error::from)
            .and_then(|r| r.ok_or_else(|| Error::not_found(format!("Room not found: {}", *id))))
            .or_graphql(ctx)
    }

    /// Mark a room available or unavailable on one date
    async fn set_room_availability(
        &self,
        ctx: &Context<'_>,
        input: SetAvailabilityInput,
    ) -> Result<Availability> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        let date = input.parse().or_graphql(ctx)?;
        set_room_availability(
            &ctx.api()?.db,
            ctx.viewer(),
            &input.room_id,
            date,
            input.is_available,
        )
        .await
        .or_graphql(ctx)
    }

    /// Request a stay; the booking starts PENDING
    async fn book_room(&self, ctx: &Context<'_>, input: BookRoomInput) -> Result<Booking> {
        ctx.viewer().require_user().or_graphql(ctx)?;
        let request = input.into_request().or_graphql(ctx)?;
        let api = ctx.api()?;
        create_booking(&api.db, ctx.viewer(), &request, &api.config.booking)
            .await
            .or_graphql(ctx)
    }

    async fn cancel_booking(&self, ctx: &Context<'_>, id: ID) -> Result<Booking> {
        cancel_booking(&ctx.api()?.db, ctx.viewer(), &id)
            .await
            .or_graphql(ctx)
    }

    async fn approve_booking(&self, ctx: &Context<'_>, id: ID) -> Result<Booking> {
        approve_booking(&ctx.api()?.db, ctx.viewer(), &id)
            .await
            .or_graphql(ctx)
    }

    async fn leave_review(&self, ctx: &Context<'_>, input: LeaveReviewInput) -> Result<Review> {
        ctx.viewer().require_user().or_graphql(ctx)?;
        input.validate().or_graphql(ctx)?;
        leave_review(
            &ctx.api()?.db,
            ctx.viewer(),
            &input.hotel_id,
            input.rating,
            input.comment,
        )
        .await
        .or_graphql(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::TestApi;
    use crate::config::Config;
    use crate::db::{testing, Booking, BookingStatus, Environment, Review, Role};
    use crate::engine::Viewer;
    use serde_json::{json, Value};

    const BOOK: &str = r#"
        mutation($input: BookRoomInput!) {
            bookRoom(input: $input) { id status checkIn checkOut guests user { email } }
        }
    "#;
    const CANCEL: &str = "mutation($id: ID!) { cancelBooking(id: $id) { status checkIn checkOut guests } }";
    const APPROVE: &str = "mutation($id: ID!) { approveBooking(id: $id) { status } }";
    const REVIEW: &str = r#"
        mutation($input: ReviewInput!) {
            leaveReview(input: $input) { rating comment hotel { rating } }
        }
    "#;

    async fn booked(api: &TestApi, viewer: &Viewer, room_id: &str, check_in: &str, check_out: &str) -> Value {
        api.ok(
            viewer,
            BOOK,
            json!({ "input": {
                "roomId": room_id,
                "checkIn": check_in,
                "checkOut": check_out,
                "guests": 2
            }}),
        )
        .await["bookRoom"]
            .clone()
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let api = TestApi::new().await;
        let register = r#"
            mutation {
                register(input: { name: "Asha", email: "asha@example.com", password: "sunrise42" }) {
                    token
                    user { email role }
                }
            }
        "#;
        let data = api.ok(&Viewer::Anonymous, register, json!({})).await;
        assert_eq!(data["register"]["user"]["role"], json!("CUSTOMER"));
        assert!(data["register"]["token"].as_str().is_some_and(|t| !t.is_empty()));

        let code = api.error_code(&Viewer::Anonymous, register, json!({})).await;
        assert_eq!(code, "DUPLICATE_RESOURCE");

        let login = r#"
            mutation($password: String!) {
                login(input: { email: "asha@example.com", password: $password }) { user { name } }
            }
        "#;
        let data = api
            .ok(&Viewer::Anonymous, login, json!({ "password": "sunrise42" }))
            .await;
        assert_eq!(data["login"]["user"]["name"], json!("Asha"));

        let code = api
            .error_code(&Viewer::Anonymous, login, json!({ "password": "wrong-one-1" }))
            .await;
        assert_eq!(code, "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_catalog_admin_flow() {
        let api = TestApi::new().await;
        let (_, admin) = api.user("admin@example.com", Role::Admin).await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;

        let add_hotel = r#"
            mutation {
                addHotel(input: { name: "Lakeview", location: "Udaipur", amenities: ["pool"],
                                  images: ["https://img.example.com/1.jpg"] }) { id name }
            }
        "#;
        assert_eq!(api.error_code(&guest, add_hotel, json!({})).await, "FORBIDDEN");
        let hotel_id = api.ok(&admin, add_hotel, json!({})).await["addHotel"]["id"].clone();

        let data = api
            .ok(
                &admin,
                r#"mutation($id: ID!) { updateHotel(id: $id, input: { location: "Jaipur" }) { name location } }"#,
                json!({ "id": hotel_id }),
            )
            .await;
        assert_eq!(data["updateHotel"], json!({ "name": "Lakeview", "location": "Jaipur" }));

        let add_room = r#"
            mutation($hotel: ID!) {
                addRoom(input: { hotelId: $hotel, type: "Deluxe", capacity: 2, price: 2500 }) { id type hotel { name } }
            }
        "#;
        let room = api.ok(&admin, add_room, json!({ "hotel": hotel_id })).await["addRoom"].clone();
        assert_eq!(room["type"], json!("Deluxe"));
        assert_eq!(room["hotel"]["name"], json!("Lakeview"));

        let code = api
            .error_code(
                &admin,
                add_room,
                json!({ "hotel": "550e8400-e29b-41d4-a716-446655440000" }),
            )
            .await;
        assert_eq!(code, "NOT_FOUND");

        let data = api
            .ok(
                &admin,
                r#"mutation($id: ID!) { updateRoom(id: $id, input: { price: 1999.5 }) { price capacity } }"#,
                json!({ "id": room["id"] }),
            )
            .await;
        assert_eq!(data["updateRoom"], json!({ "price": 1999.5, "capacity": 2 }));

        let set = r#"
            mutation($room: ID!) {
                setRoomAvailability(input: { roomId: $room, date: "2024-01-01", isAvailable: true }) {
                    roomId date isAvailable
                }
            }
        "#;
        let data = api.ok(&admin, set, json!({ "room": room["id"] })).await;
        assert_eq!(data["setRoomAvailability"]["date"], json!("2024-01-01"));
        assert_eq!(api.error_code(&guest, set, json!({ "room": room["id"] })).await, "FORBIDDEN");

        let delete = r#"mutation($id: ID!) { deleteHotel(id: $id) }"#;
        let data = api.ok(&admin, delete, json!({ "id": hotel_id })).await;
        assert_eq!(data["deleteHotel"], json!(true));
        assert_eq!(api.error_code(&admin, delete, json!({ "id": hotel_id })).await, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_booking_round_trip() {
        let api = TestApi::new().await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let room = testing::room(&api.db.pool, &hotel.id, 1000.0, 2).await;

        let booking = booked(&api, &guest, &room.id, "2024-01-01T14:00:00Z", "2024-01-03T11:00:00Z").await;
        assert_eq!(booking["status"], json!("PENDING"));
        assert_eq!(booking["user"]["email"], json!("guest@example.com"));

        let data = api.ok(&guest, CANCEL, json!({ "id": booking["id"] })).await;
        assert_eq!(data["cancelBooking"]["status"], json!("CANCELLED"));
        assert_eq!(data["cancelBooking"]["checkIn"], booking["checkIn"]);
        assert_eq!(data["cancelBooking"]["checkOut"], booking["checkOut"]);
        assert_eq!(data["cancelBooking"]["guests"], booking["guests"]);

        let code = api.error_code(&guest, CANCEL, json!({ "id": booking["id"] })).await;
        assert_eq!(code, "CONFLICT");
    }

    #[tokio::test]
    async fn test_booking_requires_valid_input_and_caller() {
        let api = TestApi::new().await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let room = testing::room(&api.db.pool, &hotel.id, 1000.0, 2).await;

        let input = |check_in: &str, check_out: &str| {
            json!({ "input": { "roomId": room.id, "checkIn": check_in, "checkOut": check_out, "guests": 1 }})
        };

        let code = api
            .error_code(&Viewer::Anonymous, BOOK, input("2024-01-01", "2024-01-02"))
            .await;
        assert_eq!(code, "UNAUTHENTICATED");

        let code = api.error_code(&guest, BOOK, input("2024-01-02", "2024-01-01")).await;
        assert_eq!(code, "BAD_USER_INPUT");

        booked(&api, &guest, &room.id, "2024-01-01", "2024-01-04").await;
        let code = api.error_code(&guest, BOOK, input("2024-01-02", "2024-01-03")).await;
        assert_eq!(code, "CONFLICT");
    }

    #[tokio::test]
    async fn test_non_admin_approve_is_forbidden() {
        let api = TestApi::new().await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        let (_, staff) = api.user("staff@example.com", Role::Staff).await;
        let (_, admin) = api.user("admin@example.com", Role::Admin).await;
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let room = testing::room(&api.db.pool, &hotel.id, 1000.0, 2).await;
        let booking = booked(&api, &guest, &room.id, "2024-01-01", "2024-01-03").await;
        let id = booking["id"].as_str().unwrap().to_string();

        for caller in [&guest, &staff] {
            let code = api.error_code(caller, APPROVE, json!({ "id": id })).await;
            assert_eq!(code, "FORBIDDEN");
        }
        let stored = Booking::find_by_id(&api.db.pool, &id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);

        let data = api.ok(&admin, APPROVE, json!({ "id": id })).await;
        assert_eq!(data["approveBooking"]["status"], json!("CONFIRMED"));
    }

    #[tokio::test]
    async fn test_bookings_are_scoped_by_role() {
        let api = TestApi::new().await;
        let (alice, alice_viewer) = api.user("alice@example.com", Role::Customer).await;
        let (_, bob) = api.user("bob@example.com", Role::Customer).await;
        let (_, admin) = api.user("admin@example.com", Role::Admin).await;
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let room = testing::room(&api.db.pool, &hotel.id, 1000.0, 2).await;

        booked(&api, &alice_viewer, &room.id, "2024-01-01", "2024-01-02").await;
        booked(&api, &alice_viewer, &room.id, "2024-02-01", "2024-02-02").await;
        booked(&api, &bob, &room.id, "2024-03-01", "2024-03-02").await;

        let query = "{ bookings { id user { id } quote { total } } }";
        let mine = api.ok(&alice_viewer, query, json!({})).await;
        let mine = mine["bookings"].as_array().unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|b| b["user"]["id"] == json!(alice.id)));
        assert_eq!(mine[0]["quote"]["total"], json!(1100.0));

        let all = api.ok(&admin, query, json!({})).await;
        assert_eq!(all["bookings"].as_array().map(|b| b.len()), Some(3));

        let code = api
            .error_code(
                &bob,
                "query($email: String) { me(email: $email) { bookings { id } } }",
                json!({ "email": "alice@example.com" }),
            )
            .await;
        assert_eq!(code, "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_second_review_is_duplicate() {
        let api = TestApi::new().await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let input = json!({ "input": { "hotelId": hotel.id, "rating": 4, "comment": "Clean" } });

        let data = api.ok(&guest, REVIEW, input.clone()).await;
        assert_eq!(data["leaveReview"]["hotel"]["rating"], json!(4.0));

        let code = api.error_code(&guest, REVIEW, input).await;
        assert_eq!(code, "DUPLICATE_RESOURCE");
        assert_eq!(Review::list_by_hotel(&api.db.pool, &hotel.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_errors_are_sanitized() {
        let config = Config::default();
        let api = TestApi::with_config(config).await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        sqlx::query("DROP TABLE reviews").execute(&api.db.pool).await.unwrap();
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let input = json!({ "input": { "hotelId": hotel.id, "rating": 4 } });

        let response = api.run(&guest, REVIEW, input.clone()).await;
        assert_eq!(response.errors[0].message, "Internal server error during DB operation");

        let mut dev = Config::default();
        dev.server.environment = Environment::Development;
        let api = TestApi::with_config(dev).await;
        let (_, guest) = api.user("guest@example.com", Role::Customer).await;
        sqlx::query("DROP TABLE reviews").execute(&api.db.pool).await.unwrap();
        let hotel = testing::hotel(&api.db.pool, "H", "Goa", &[]).await;
        let input = json!({ "input": { "hotelId": hotel.id, "rating": 4 } });

        let response = api.run(&guest, REVIEW, input).await;
        assert!(response.errors[0].message.contains("reviews"));
    }
}
