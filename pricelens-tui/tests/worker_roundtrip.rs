//! App state ↔ worker thread over real channels, offline provider.

use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;

use pricelens_core::config::DashboardConfig;
use pricelens_core::data::SyntheticProvider;
use pricelens_core::ticker::NameTable;
use pricelens_tui::app::{AppState, Focus};
use pricelens_tui::worker::{spawn_worker, WorkerCommand};

fn wait_for_answer(app: &mut AppState) {
    while app.is_rendering() {
        let resp = app
            .worker_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker answered");
        app.handle_response(resp);
    }
}

#[test]
fn render_request_fills_table_and_chart() {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let provider = SyntheticProvider::new().with_unknown("BADSYM");
    let handle = spawn_worker(Box::new(provider), NameTable::builtin(), cmd_rx, resp_tx).unwrap();

    let config = DashboardConfig::default();
    let mut app = AppState::new(&config, Local::now().date_naive(), cmd_tx.clone(), resp_rx);
    app.tickers_text = "AAPL, BADSYM, TM".into();
    app.request_render();
    wait_for_answer(&mut app);

    let output = app.output.as_ref().unwrap();
    assert!(output.error.is_none(), "{:?}", output.error);
    assert_eq!(output.available, vec!["Apple", "TOYOTA"]);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.chart.as_ref().unwrap().series().len(), 2);

    // Deselect everything: the chart goes away, the list stays.
    app.focus = Focus::Companies;
    app.selection = Some(Vec::new());
    app.request_render();
    wait_for_answer(&mut app);

    let output = app.output.as_ref().unwrap();
    assert!(output.chart.is_none());
    assert!(output.error.is_some());
    assert_eq!(app.available().len(), 2);

    cmd_tx.send(WorkerCommand::Shutdown).unwrap();
    handle.join().unwrap();
}
