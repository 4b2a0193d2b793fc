use crate::cli::ServeArgs;
use crate::infra::{AppState, BookingStack, Directory, Inbox, Store};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ceremony_booking::config::AppConfig;
use ceremony_booking::error::AppError;
use ceremony_booking::telemetry;
use ceremony_booking::workflows::ceremony::{NotificationQueue, ReminderSweep};
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(Directory::default());
    let inbox = Arc::new(Inbox::new(directory.clone()));
    let (queue, _delivery_worker) = NotificationQueue::spawn(inbox.clone());
    let stack = BookingStack::assemble(&config.booking, directory, Arc::new(queue));
    let _reminder_scheduler =
        spawn_reminder_scheduler(stack.reminders.clone(), config.booking.reminder_interval);

    let app = with_booking_routes(&stack, inbox)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        reminder_interval_secs = config.booking.reminder_interval.as_secs(),
        "ceremony booking service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run the reminder sweep every `period` against the local wall clock.
fn spawn_reminder_scheduler(
    sweep: Arc<ReminderSweep<Store, NotificationQueue>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep.run(Local::now().naive_local()) {
                warn!(error = %err, "reminder sweep failed");
            }
        }
    })
}
