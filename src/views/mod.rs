// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View models: the data layer the screens read from.

pub mod activity;
pub mod social;

pub use activity::{ActivityData, FeedFilter};
pub use social::SocialData;
