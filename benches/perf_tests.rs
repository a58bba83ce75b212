use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fmtlog::{log_info, render, sprintf, ColorMode, FmtArg, LineHandler, Logger, LoggerConfig};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::io;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static LOG4RS_INIT: Once = Once::new();

const DESCRIPTION: &str = "This is a longer description that includes some special characters !@#$^&*() \
                           and provides more context about the event. It also contains some metrics like \
                           CPU: 95, Memory: 2.5GB, Network: 1.2Gbps";

// Handler that drops every line - isolates formatting and line assembly
struct NullHandler;

impl LineHandler for NullHandler {
    fn handle_line(&self, line: &[u8]) -> io::Result<()> {
        black_box(line);
        Ok(())
    }
}

fn setup_log4rs(log_file: &Path) {
    LOG4RS_INIT.call_once(|| {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}{n}")))
            .build(log_file)
            .unwrap();

        let config = Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .build(Root::builder().appender("logfile").build(LevelFilter::Info))
            .unwrap();

        log4rs::init_config(config).unwrap();
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render");
    let long = "x".repeat(4096);

    group.bench_function("scratch", |b| {
        b.iter(|| render(black_box("id=%d active=%s load=%6.2f%%"), &[FmtArg::Int(42, 32), FmtArg::Str("yes"), FmtArg::Float(95.5)]))
    });
    group.bench_function("heap_fallback", |b| {
        b.iter(|| render(black_box("%s"), &[FmtArg::Str(&long)]))
    });
    group.bench_function("std_format", |b| {
        b.iter(|| format!("id={} active={} load={:6.2}%", black_box(42), "yes", 95.5))
    });
    group.bench_function("sprintf_macro", |b| {
        b.iter(|| sprintf!("id=%d desc=%s", black_box(42u64), DESCRIPTION))
    });

    group.finish();
}

fn bench_logging_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Logging Comparison");
    group.sample_size(20);

    let logger = Logger::with_handler(LoggerConfig::default().with_color(ColorMode::Never), NullHandler);
    group.bench_function("fmtlog_null_handler", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            log_info!(logger, "Test perf: iteration=%llu, desc=%s", i, DESCRIPTION).unwrap()
        })
    });

    let dir = tempdir().unwrap();
    setup_log4rs(&dir.path().join("traditional.log"));
    group.bench_function("log4rs_file", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            log::info!("Test perf: iteration={}, desc={}", i, DESCRIPTION)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_logging_comparison);
criterion_main!(benches);
