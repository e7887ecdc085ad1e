//! ec2-autostop - scheduled multi-region EC2 stop sweep.
//!
//! Stops every running instance in every region of the account unless the
//! instance carries the `AutoStop=no` opt-out tag, then posts one
//! consolidated report to Slack. Designed to run as a one-shot job
//! (CronJob or scheduled Lambda-style invocation).

#![allow(async_fn_in_trait)]

pub mod config;
pub mod ec2;
pub mod error;
pub mod identity;
pub mod logging;
pub mod notify;
pub mod policy;
pub mod provider;
pub mod report;
pub mod sweep;
pub mod types;
