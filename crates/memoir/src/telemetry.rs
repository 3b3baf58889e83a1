// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging of memoization activity.
//!
//! With the `logs` feature every `invoke` emits one `tracing` event carrying the memoizer
//! name and the activity. Field names are `memo.name`, `memo.activity` and, for panics,
//! `memo.panic`. Events only observe: every failure still reaches the caller.

use std::any::Any;

use crate::MemoizerName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoActivity<'a> {
    Hit,
    Computed,
    ComputedNull,
    Failed,
    /// Carries the panic message.
    Panicked(&'a str),
}

impl MemoActivity<'_> {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "memo.hit",
            Self::Computed => "memo.computed",
            Self::ComputedNull => "memo.computed_null",
            Self::Failed => "memo.failed",
            Self::Panicked(_) => "memo.panicked",
        }
    }
}

pub(crate) fn record(name: MemoizerName, activity: MemoActivity<'_>) {
    let activity_name = activity.as_str();

    // Tracing levels must be constant, hence one macro call per activity.
    #[cfg(feature = "logs")]
    match activity {
        MemoActivity::Hit => tracing::trace!(memo.name = name, memo.activity = activity_name, "memoized value reused"),
        MemoActivity::Computed => tracing::debug!(memo.name = name, memo.activity = activity_name, "value computed and stored"),
        MemoActivity::ComputedNull => {
            tracing::debug!(memo.name = name, memo.activity = activity_name, "computation produced no value, nothing stored");
        }
        MemoActivity::Failed => tracing::debug!(memo.name = name, memo.activity = activity_name, "computation failed, nothing stored"),
        MemoActivity::Panicked(message) => tracing::error!(
            memo.name = name,
            memo.activity = activity_name,
            memo.panic = message,
            "computation panicked, resuming unwind"
        ),
    }

    #[cfg(not(feature = "logs"))]
    let _ = (name, activity_name);
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
