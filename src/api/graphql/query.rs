use async_graphql::{Context, Object, Result, ID};

use super::inputs::{HotelFilterInput, QuoteInput};
use super::types::load_room;
use super::{ContextExt, ResultExt};
use crate::db::{Booking, Hotel, Room, User};
use crate::engine::{list_bookings, nights_between, search_hotels, Quote};
use crate::error::Error;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Hotels matching every given filter, best rated first
    async fn hotels(
        &self,
        ctx: &Context<'_>,
        filter: Option<HotelFilterInput>,
    ) -> Result<Vec<Hotel>> {
        let api = ctx.api()?;
        let filter = filter.unwrap_or_default().into_filter().or_graphql(ctx)?;
        search_hotels(&api.db, &filter).await.or_graphql(ctx)
    }

    async fn hotel(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Hotel>> {
        Hotel::find_by_id(&ctx.api()?.db, &id)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }

    /// Rooms of one hotel; without `hotelId`, every room (admin only)
    async fn rooms(&self, ctx: &Context<'_>, hotel_id: Option<ID>) -> Result<Vec<Room>> {
        let api = ctx.api()?;
        let rooms = match hotel_id {
            Some(hotel_id) => Room::list_by_hotel(&api.db, &hotel_id).await,
            None => {
                ctx.viewer().require_admin().or_graphql(ctx)?;
                Room::list_all(&api.db).await
            }
        };
        rooms.map_err(Error::from).or_graphql(ctx)
    }

    /// The caller's account. Admins may look up another user by id, email or name.
    async fn me(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        email: Option<String>,
        name: Option<String>,
    ) -> Result<Option<User>> {
        let api = ctx.api()?;
        let viewer = ctx.viewer();
        let (caller_id, _) = viewer.require_user().or_graphql(ctx)?;

        let lookup = id.is_some() || email.is_some() || name.is_some();
        if lookup {
            viewer.require_admin().or_graphql(ctx)?;
        }

        let user = if let Some(id) = id {
            User::find_by_id(&api.db, &id).await
        } else if let Some(email) = email {
            User::find_by_email(&api.db, &email.trim().to_lowercase()).await
        } else if let Some(name) = name {
            User::find_by_name(&api.db, &name).await
        } else {
            User::find_by_id(&api.db, caller_id).await
        };
        user.map_err(Error::from).or_graphql(ctx)
    }

    /// All accounts (admin only)
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        ctx.viewer().require_admin().or_graphql(ctx)?;
        User::list_all(&ctx.api()?.db)
            .await
            .map_err(Error::from)
            .or_graphql(ctx)
    }

    /// The caller's bookings; admins see every booking
    async fn bookings(&self, ctx: &Context<'_>) -> Result<Vec<Booking>> {
        list_bookings(&ctx.api()?.db, ctx.viewer())
            .await
            .or_graphql(ctx)
    }

    /// Cost breakdown of a prospective stay
    async fn quote(&self, ctx: &Context<'_>, input: QuoteInput) -> Result<Quote> {
        let request = input.into_request().or_graphql(ctx)?;
        let room = load_room(ctx, &request.room_id).await?;
        let nights = nights_between(request.check_in, request.check_out);
        Ok(ctx
            .api()?
            .pricing
            .quote(room.price, room.capacity, request.guests, nights))
    }
}
