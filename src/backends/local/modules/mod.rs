// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod empty_source;
pub mod event_counter;
pub mod int_producer;
pub mod memory_output;
pub mod prescaler;

pub use empty_source::*;
pub use event_counter::*;
pub use int_producer::*;
pub use memory_output::*;
pub use prescaler::*;
