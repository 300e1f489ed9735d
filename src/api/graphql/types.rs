//! GraphQL object types over the database models.

use async_graphql::{Context, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

use super::{ContextExt, ResultExt};
use crate::db::{Availability, Booking, BookingStatus, Hotel, Review, Role, Room, User};
use crate::engine::{nights_between, Quote};
use crate::error::Error;

#[Object]
impl Hotel {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn location(&self) -> &str {
        &self.location
    }

    async fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn amenities(&self) -> Vec<String> {
        self.amenity_list()
    }

    /// Image URLs in display order
    async fn images(&self) -> Vec<String> {
        self.image_list()
    }

    /// Average review rating, null until the first review
    async fn rating(&self) -> Option<f64> {
        self.rating
    }

    async fn created_at(&self) -> &str {
        &self.created_at
    }

    async fn rooms(&self, ctx: &Context<'_>) -> Result<Vec<Room>> {
        Room::list_by_hotel(&ctx.api()?.db, &self.id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }

    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        Review::list_by_hotel(&ctx.api()?.db, &self.id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }
}

#[Object]
impl Room {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn hotel_id(&self) -> ID {
        ID(self.hotel_id.clone())
    }

    async fn room_number(&self) -> Option<&str> {
        self.room_number.as_deref()
    }

    #[graphql(name = "type")]
    async fn room_type(&self) -> &str {
        &self.room_type
    }

    async fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Nightly price
    async fn price(&self) -> f64 {
        self.price
    }

    async fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn hotel(&self, ctx: &Context<'_>) -> Result<Hotel> {
        Hotel::find_by_id(&ctx.api()?.db, &self.hotel_id)
            .await
            .map_err(Error::from)
            .and_then(|h| h.ok_or_else(|| Error::not_found("Hotel not found")))
            .or_graphql(ctx)
    }

    async fn availability(&self, ctx: &Context<'_>) -> Result<Vec<Availability>> {
        Availability::list_for_room(&ctx.api()?.db, &self.id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }
}

#[Object]
impl Availability {
    async fn room_id(&self) -> ID {
        ID(self.room_id.clone())
    }

    /// `YYYY-MM-DD`
    async fn date(&self) -> &str {
        &self.date
    }

    async fn is_available(&self) -> bool {
        self.is_available
    }
}

#[Object]
impl Booking {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn check_in(&self) -> &str {
        &self.check_in
    }

    async fn check_out(&self) -> &str {
        &self.check_out
    }

    async fn guests(&self) -> i64 {
        self.guests
    }

    async fn status(&self) -> BookingStatus {
        self.status
    }

    async fn created_at(&self) -> &str {
        &self.created_at
    }

    async fn room(&self, ctx: &Context<'_>) -> Result<Room> {
        load_room(ctx, &self.room_id).await
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        User::find_by_id(&ctx.api()?.db, &self.user_id)
            .await
            .map_err(Error::from)
            .and_then(|u| u.ok_or_else(|| Error::not_found("User not found")))
            .or_graphql(ctx)
    }

    /// Cost of the stay at the room's current price
    async fn quote(&self, ctx: &Context<'_>) -> Result<Quote> {
        let room = load_room(ctx, &self.room_id).await?;
        let nights = match (stored_instant(&self.check_in), stored_instant(&self.check_out)) {
            (Some(check_in), Some(check_out)) => nights_between(check_in, check_out),
            _ => 1,
        };
        Ok(ctx
            .api()?
            .pricing
            .quote(room.price, room.capacity, self.guests, nights))
    }
}

#[Object]
impl Review {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn rating(&self) -> i64 {
        self.rating
    }

    async fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    async fn created_at(&self) -> &str {
        &self.created_at
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        User::find_by_id(&ctx.api()?.db, &self.user_id)
            .await
            .map_err(Error::from)
            .and_then(|u| u.ok_or_else(|| Error::not_found("User not found")))
            .or_graphql(ctx)
    }

    async fn hotel(&self, ctx: &Context<'_>) -> Result<Hotel> {
        Hotel::find_by_id(&ctx.api()?.db, &self.hotel_id)
            .await
            .map_err(Error::from)
            .and_then(|h| h.ok_or_else(|| Error::not_found("Hotel not found")))
            .or_graphql(ctx)
    }
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    /// Visible to the user themselves and to admins, null otherwise
    async fn email(&self, ctx: &Context<'_>) -> Option<&str> {
        ctx.viewer()
            .can_see_user(&self.id)
            .then_some(self.email.as_str())
    }

    async fn role(&self) -> Role {
        self.role
    }

    async fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Visible to the user themselves and to admins
    async fn bookings(&self, ctx: &Context<'_>) -> Result<Vec<Booking>> {
        let viewer = ctx.viewer();
        if viewer.id().is_none() {
            return Err(Error::AuthenticationRequired).or_graphql(ctx);
        }
        if !viewer.can_see_user(&self.id) {
            return Err(Error::forbidden("Not allowed to view these bookings")).or_graphql(ctx);
        }
        Booking::list_by_user(&ctx.api()?.db, &self.id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }
}

#[Object(name = "BookingQuote")]
impl Quote {
    async fn nights(&self) -> i64 {
        self.nights
    }

    async fn base(&self) -> f64 {
        self.base
    }

    async fn extra_guests(&self) -> i64 {
        self.extra_guests
    }

    async fn extra_charge(&self) -> f64 {
        self.extra_charge
    }

    async fn tax(&self) -> f64 {
        self.tax
    }

    async fn total(&self) -> f64 {
        self.total
    }

    /// Display lines with amounts rounded to whole units
    async fn summary(&self) -> Vec<String> {
        self.summary.clone()
    }
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

pub(super) async fn load_room(ctx: &Context<'_>, id: &str) -> Result<Room> {
    Room::find_by_id(&ctx.api()?.db, id)
        .await
        .map_err(Error::from)
        .and_then(|r| r.ok_or_else(|| Error::not_found(format!("Room not found: {}", id))))
        .or_graphql(ctx)
}

fn stored_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
