use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    collections::VecDeque,
    future::Future,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{
    browser::PageDriver,
    error::BrowserError,
    match_detail::MatchDetailScraper,
    types::{MatchRecord, SeasonLink},
};

type Job = (usize, SeasonLink);

fn next_job(queue: &Mutex<VecDeque<Job>>) -> Option<Job> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).pop_front()
}

/// Extracts every link with `workers` independent browser sessions.
///
/// Each worker opens its own session through `connect` before taking its
/// first job and keeps it until the queue is empty; nothing but the queue and
/// the result channel is shared. Records come back in input order.
pub async fn extract_matches<D, F, Fut>(
    links: Vec<SeasonLink>,
    workers: usize,
    scraper: Arc<MatchDetailScraper>,
    connect: F,
) -> Result<Vec<MatchRecord>>
where
    D: PageDriver + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<D, BrowserError>> + Send + 'static,
{
    let total = links.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let workers = workers.clamp(1, total);

    let queue: Arc<Mutex<VecDeque<Job>>> = Arc::new(Mutex::new(links.into_iter().enumerate().collect()));
    let connect = Arc::new(connect);
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, MatchRecord)>();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} matches ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    info!("Starting {} extraction workers for {} links", workers, total);
    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let queue = Arc::clone(&queue);
        let connect = Arc::clone(&connect);
        let scraper = Arc::clone(&scraper);
        let tx = tx.clone();
        let pb = pb.clone();

        let handle = tokio::spawn(async move {
            let mut session = connect(i)
                .await
                .with_context(|| format!("Worker {} could not start a browser session", i))?;
            info!("Worker {} started", i);

            while let Some((index, link)) = next_job(&queue) {
                let record = scraper.extract(&mut session, &link).await;
                if tx.send((index, record)).is_err() {
                    return Err(anyhow!("Worker {}: result channel closed", i));
                }
                pb.inc(1);
            }

            if let Err(e) = session.close().await {
                error!("Worker {} failed to close its browser: {}", i, e);
            }
            info!("Worker {} finished", i);
            Ok::<(), anyhow::Error>(())
        });
        handles.push(handle);
    }
    drop(tx);

    let mut first_error = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Worker failed with error: {:#}", e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                error!("Worker panicked: {:?}", e);
                first_error.get_or_insert(anyhow!("Worker panicked: {}", e));
            }
        }
    }
    pb.finish_and_clear();

    if let Some(e) = first_error {
        return Err(e);
    }

    let mut results = Vec::with_capacity(total);
    while let Some(item) = rx.recv().await {
        results.push(item);
    }
    results.sort_by_key(|(index, _)| *index);
    info!("Extracted {} match records", results.len());

    Ok(results.into_iter().map(|(_, record)| record).collect())
}
