use async_graphql::MergedObject;

use crate::gql::domains::bookings::BookingQuery;
use crate::gql::domains::dashboard::DashboardQuery;
use crate::gql::domains::fields::FieldQuery;
use crate::gql::domains::reviews::ReviewQuery;
use crate::gql::domains::slots::TimeSlotQuery;
use crate::gql::domains::users::UserQuery;
use crate::gql::domains::venues::VenueQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    BookingQuery,
    DashboardQuery,
    FieldQuery,
    ReviewQuery,
    TimeSlotQuery,
    UserQuery,
    VenueQuery,
);
