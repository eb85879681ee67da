//! A hundred units of work with random delays, rendered with ETA.

use std::time::Duration;

use rand::Rng;
use termspin::*;

fn main() -> std::io::Result<()> {
    let bar = ProgressBar::builder(100)
        .style(BarStyle::Striped)
        .show_eta(true)
        .on_finish(|| println!("all chunks processed"))
        .start()?;

    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        std::thread::sleep(Duration::from_millis(rng.gen_range(20..120)));
        bar.step();
    }
    bar.finish()?;

    for style in BarStyle::ALL {
        let bar = ProgressBar::builder(40)
            .style(style)
            .interval(Duration::from_millis(50))
            .start()?;
        for _ in 0..40 {
            std::thread::sleep(Duration::from_millis(15));
            bar.step();
        }
        bar.finish()?;
    }
    Ok(())
}
