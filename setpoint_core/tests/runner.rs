use setpoint_core::mocks::{FailingSource, FixedSource};
use setpoint_core::{ResetError, TrimRespondController, run_cycles};
use setpoint_traits::{ReadingSource, Snapshot};

fn pressure_loop(initial: f64) -> TrimRespondController {
    TrimRespondController::builder()
        .with_limits(0.5, 1.5)
        .with_initial(initial)
        .try_build()
        .expect("pressure loop")
}

/// Hands out a fixed list of snapshots, then reports exhaustion.
struct Finite(Vec<Snapshot>);

impl ReadingSource for Finite {
    fn sample(&mut self) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        if self.0.is_empty() {
            return Err("empty".into());
        }
        Ok(self.0.remove(0))
    }

    fn is_exhausted(&self) -> bool {
        self.0.is_empty()
    }
}

#[test]
fn runs_exactly_n_cycles() {
    let mut c = pressure_loop(1.0);
    let mut src = FixedSource(Snapshot::new(vec![0.4; 40]));
    let events = run_cycles(&mut c, &mut src, 3);
    assert_eq!(events.len(), 3);
    assert_eq!(events.iter().map(|e| e.cycle).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(c.is_active());
    assert!((c.setpoint() - 0.94).abs() < 1e-12);
}

#[test]
fn stops_when_source_runs_dry() {
    let mut c = pressure_loop(1.0);
    let mut src = Finite(vec![Snapshot::new(vec![0.4]), Snapshot::new(vec![0.4])]);
    let events = run_cycles(&mut c, &mut src, 10);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.outcome.is_ok()));
}

#[test]
fn source_faults_are_reported_per_cycle() {
    let mut c = pressure_loop(1.0);
    let events = run_cycles(&mut c, &mut FailingSource, 2);
    assert_eq!(events.len(), 2);
    for e in &events {
        assert!(matches!(&e.outcome, Err(ResetError::Source(msg)) if msg.contains("failing source")));
    }
    assert!((c.setpoint() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn boxed_sources_forward_exhaustion() {
    let mut c = pressure_loop(1.0);
    let mut src: Box<dyn ReadingSource> = Box::new(Finite(vec![Snapshot::new(vec![0.9; 5])]));
    let events = run_cycles(&mut c, &mut src, 5);
    assert_eq!(events.len(), 1);
}
