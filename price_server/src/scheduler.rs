//! Periodic update trigger.
//!
//! A ticker thread queues `Job::RunUpdate { reply: None }` on the worker queue at a
//! fixed interval. Scheduled runs only log their report.

use crate::worker::Job;
use crossbeam_channel::{Receiver, Sender, select, tick};
use log::{error, info};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawn a thread that queues a scheduled `Job::RunUpdate` every `interval` until
/// `stop_rx` fires or the worker queue is closed.
pub fn start_scheduler(interval: Duration, jobs: Sender<Job>, stop_rx: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Scheduled price updates every {:?}", interval);
        let ticker = tick(interval);
        loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    if let Err(e) = jobs.send(Job::RunUpdate { reply: None }) {
                        error!("Update worker is gone, stopping scheduler: {}", e);
                        break;
                    }
                }
            }
        }
        info!("Scheduler stopping...");
    })
}
