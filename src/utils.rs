use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_thread_names(true)
        .with_target(false)
        .init();
}

pub fn format_number(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.workers == 0 {
        anyhow::bail!("--workers must be greater than 0");
    }

    if args.top == 0 {
        anyhow::bail!("--top must be greater than 0");
    }

    if let Some(capacity) = args.queue_capacity {
        if capacity == 0 {
            anyhow::bail!("--queue-capacity must be greater than 0");
        }
    }

    if args.http_timeout_secs == 0 {
        anyhow::bail!("--http-timeout-secs must be greater than 0");
    }

    Ok(())
}
