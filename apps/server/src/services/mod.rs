// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store access for the relay.

pub mod memory;
pub mod redis_store;
pub mod store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{bounded, PayloadStore, StoreError};
