//! Progress output for the phases of a run.
//!
//! Each phase prints a `starting` line and a `done` line with the elapsed time to stderr
//! and reports the time in ms through the reporter.

use super::*;
use std::time::*;

/// This function will measure how long it takes to execute the given lambda,
/// print the time, report it under `<key>_running_time_ms` and return the result of the lambda.
pub fn report_time<Out, F: FnOnce() -> Out>(name: &str, f: F) -> Out {
    let (res, t_passed) = measure(|| {
        eprintln!("starting {}", name);
        f()
    });
    let t_passed = t_passed.as_secs_f64() * 1000.0;
    eprintln!("{} done - took: {}ms", name, t_passed);
    report!(format!("{}_running_time_ms", name.replace(' ', "_")), t_passed);
    res
}

/// This function will measure how long it takes to execute the given lambda
/// and return a tuple of the result of the lambda and a duration object.
pub fn measure<Out, F: FnOnce() -> Out>(f: F) -> (Out, Duration) {
    let start = Instant::now();
    let res = f();
    (res, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_time_is_reported_under_phase_name() {
        REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));
        let answer = report_time("reading network", || 42);
        let reporter = REPORTER.with(|reporter| reporter.borrow_mut().take()).unwrap();

        assert_eq!(answer, 42);
        match reporter.current {
            CurrentReportingContext::Object(object) => {
                assert_eq!(object.len(), 1);
                assert!(object["reading_network_running_time_ms"].as_f64().unwrap() >= 0.0);
            }
            CurrentReportingContext::Collection(_) => panic!("expected an object"),
        }
    }
}
