//! Spinner and progress bar around async work.
//!
//! The render threads are plain OS threads, so they keep animating while the
//! tokio runtime drives the downloads.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use termspin::*;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut spinner = Spinner::builder("resolving mirrors")
        .theme(SpinnerStyle::Earth)
        .final_text(format!(" {}", "mirrors resolved".green()))
        .build();
    spinner.start()?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    spinner.stop()?;

    let files = ["index.json", "core.tar", "docs.tar", "assets.tar", "checksums"];
    let bar = Arc::new(
        ProgressBar::builder(files.len() as u64 * 10)
            .style(BarStyle::Dna)
            .show_eta(true)
            .start()?,
    );

    let (tx, mut rx) = mpsc::channel(16);
    for (i, name) in files.into_iter().enumerate() {
        let tx = tx.clone();
        let bar = Arc::clone(&bar);
        tokio::spawn(async move {
            for _ in 0..10 {
                tokio::time::sleep(Duration::from_millis(60 + 40 * i as u64)).await;
                bar.step();
            }
            drop(bar);
            let _ = tx.send(name).await;
        });
    }
    drop(tx);

    let mut done = Vec::new();
    while let Some(name) = rx.recv().await {
        done.push(name);
    }

    let Ok(bar) = Arc::try_unwrap(bar) else {
        unreachable!("every download task has finished");
    };
    bar.finish()?;
    println!("{} {}", "fetched".bold(), done.join(", ").dimmed());
    Ok(())
}
