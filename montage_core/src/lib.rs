// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session state machine and presentation model for autoplay video montages.
//!
//! `montage_core` drives a single page that plays a fixed list of embedded
//! videos back to back over a looping background track, then falls back to
//! a thumbnail gallery. It is `no_std` compatible (with `alloc`) and
//! performs no I/O: the controller returns effects for a host to carry out.
//!
//! # Architecture
//!
//! ```text
//!   click / timer / embed message / audio promise
//!       │
//!       ▼
//!   Input ──► PlaybackController::handle() ──► Effects ──► Host
//!                        │                                   │
//!                        ▼                                   │
//!                  SessionState                              │
//!                        │                                   │
//!                        ▼                                   │
//!                View ──► Presenter::present()               │
//!                                                            │
//!   Input::TimerFired / Input::AudioSettled ◄────────────────┘
//! ```
//!
//! **[`session`]**: Stage, current index and transition flag, plus the
//! playback tickets that identify one playback of one item.
//!
//! **[`controller`]**: [`PlaybackController`](controller::PlaybackController),
//! the only writer of the session, and the `Input`/`Effect` vocabulary.
//!
//! **[`playlist`]**: The fixed, ordered list of item URLs.
//!
//! **[`embed`]**: Provider detection, autoplay URL rewriting and decoding of
//! the providers' `postMessage` payloads.
//!
//! **[`gallery`]**: Tiles with labels and thumbnails, including video id
//! extraction and the placeholder palette.
//!
//! **[`layout`]**: Stage frame and gallery grid geometry via `kurbo`.
//!
//! **[`view`]**: Borrowed per-stage snapshots for presenters.
//!
//! **[`backend`]**: The [`Host`](backend::Host) and
//! [`Presenter`](backend::Presenter) traits that platform backends implement.
//!
//! **[`audio`]**, **[`timer`]**, **[`time`]**: Effect payloads and the
//! millisecond time types they use.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`error`]**: [`CommandError`](error::CommandError).
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod audio;
pub mod backend;
pub mod controller;
pub mod embed;
pub mod error;
pub mod gallery;
pub mod layout;
pub mod playlist;
pub mod session;
pub mod time;
pub mod timer;
pub mod trace;
pub mod view;
