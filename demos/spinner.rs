//! Every spinner preset, one after another.
//!
//! Lifecycle diagnostics go to stderr through `tracing-subscriber`; run with
//! `2>/dev/null` to see the animation alone.

use std::time::Duration;

use termspin::*;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    for style in SpinnerStyle::ALL {
        let mut spinner = Spinner::builder(format!("{style:?} spinner"))
            .theme(style)
            .color(Color::Cyan)
            .interval(Duration::from_millis(80))
            .final_text(format!(" {style:?} finished"))
            .build();
        spinner.run(|| sleep(1500))?;
    }

    // Scoped form: the guard stops the spinner when it goes out of scope.
    let mut spinner = Spinner::builder("compiling")
        .final_symbol("✘")
        .final_text(" compile aborted")
        .color(Color::Red)
        .on_finish(|| tracing::info!("spinner callback ran"))
        .build();
    {
        let _guard = spinner.scoped()?;
        sleep(1200);
    }

    Ok(())
}

fn sleep(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
