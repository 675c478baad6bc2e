use habitgraph_core::ResetTicker;

use super::open_session;

/// Run the daily reset ticker until Ctrl-C.
///
/// Other `habitgraph` invocations may write the same database while this
/// runs, so the stored graph is re-read before every check and nothing is
/// written except on a rollover.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;
    let ticker = ResetTicker::new(session.config().reset.interval());
    let stop = ticker.cancellation_token();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.cancel();
            }
        });

        tracing::info!(period = ?ticker.period(), "watching for day rollover");
        eprintln!("Watching for day rollover (Ctrl-C to stop)");
        ticker
            .run(|| {
                session.reload();
                if session.run_daily_reset() {
                    eprintln!("New day: {}", session.today());
                }
            })
            .await;
    });

    Ok(())
}
