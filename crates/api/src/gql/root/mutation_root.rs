use async_graphql::MergedObject;

use crate::gql::domains::bookings::BookingMutation;
use crate::gql::domains::fields::FieldMutation;
use crate::gql::domains::reviews::ReviewMutation;
use crate::gql::domains::slots::TimeSlotMutation;
use crate::gql::domains::users::UserMutation;
use crate::gql::domains::venues::VenueMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    BookingMutation,
    FieldMutation,
    ReviewMutation,
    TimeSlotMutation,
    UserMutation,
    VenueMutation,
);
