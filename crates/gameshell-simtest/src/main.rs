//! GameShell Headless Overlay Harness
//!
//! Drives the pause-overlay lifecycle in-process: no window, no renderer.
//! The harness plays the host: it mounts and unmounts the overlay, delivers
//! key presses by name, and checks what the callbacks saw.
//!
//! Usage:
//!   cargo run -p gameshell-simtest
//!   cargo run -p gameshell-simtest -- --verbose
//!   cargo run -p gameshell-simtest -- --json

use std::sync::{Arc, Mutex, PoisonError};

use gameshell_logic::config::{validate_config, ConfigError, ConfigLoadError, OverlayConfig};
use gameshell_logic::host::{OverlayHost, OverlayState};
use gameshell_logic::input::KeyRegistry;
use gameshell_logic::keys;
use gameshell_logic::overlay::{MenuAction, OverlayActions, PauseOverlay};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── Bundled config (same file the client loads by default) ──────────────
const CONFIG_JSON: &str = include_str!("../../../data/overlay_config.json");

const HOST_SWEEP_SEED: u64 = 42;
const HOST_SWEEP_STEPS: usize = 2_000;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Records every callback the overlay fires, in order.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<MenuAction>>>,
}

impl Recorder {
    fn actions(&self) -> OverlayActions {
        let calls = Arc::clone(&self.calls);
        OverlayActions::forwarding_to(move |action| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action);
        })
    }

    fn calls(&self) -> Vec<MenuAction> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, action: MenuAction) -> usize {
        self.calls().iter().filter(|&&a| a == action).count()
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== GameShell Overlay Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Bundled configuration
    results.extend(validate_config_file(json));

    // 2. Binding lifetime across mount/unmount
    results.extend(validate_binding_lifecycle(json));

    // 3. Cancellation key delivery
    results.extend(validate_cancellation(json));

    // 4. Menu action routing
    results.extend(validate_routing(json));

    // 5. Randomized host sweep
    results.extend(validate_host_sweep(json, verbose));

    let failed = results.iter().filter(|r| !r.passed).count();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(report) => println!("{}", report),
            Err(e) => eprintln!("failed to serialize report: {}", e),
        }
    } else {
        // ── Summary ──
        println!();
        let passed = results.iter().filter(|r| r.passed).count();
        let total = results.len();

        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }

        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn section(quiet: bool, title: &str) {
    if !quiet {
        println!("--- {} ---", title);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config_file(quiet: bool) -> Vec<TestResult> {
    section(quiet, "Configuration");
    let mut results = Vec::new();

    match OverlayConfig::from_json_str(CONFIG_JSON) {
        Ok(config) => {
            results.push(TestResult {
                name: "config_bundled_parses".into(),
                passed: true,
                detail: format!(
                    "cancel='{}' open='{}' ignore_repeats={}",
                    config.cancel_key, config.open_key, config.ignore_repeats
                ),
            });
            results.push(TestResult {
                name: "config_bundled_cancels_with_escape".into(),
                passed: config.cancel_key == keys::ESCAPE,
                detail: format!("cancel key is '{}'", config.cancel_key),
            });
        }
        Err(e) => results.push(TestResult {
            name: "config_bundled_parses".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    let default_errors = validate_config(&OverlayConfig::default());
    results.push(TestResult {
        name: "config_default_valid".into(),
        passed: default_errors.is_empty(),
        detail: format!("{} validation error(s)", default_errors.len()),
    });

    let rejected = OverlayConfig::from_json_str(r#"{ "cancel_key": "Esc" }"#);
    results.push(TestResult {
        name: "config_unknown_key_rejected".into(),
        passed: matches!(
            &rejected,
            Err(ConfigLoadError::Invalid(errors))
                if errors == &[ConfigError::UnknownKey("Esc".into())]
        ),
        detail: match &rejected {
            Ok(_) => "accepted 'Esc'".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── 2. Binding Lifecycle ────────────────────────────────────────────────

fn validate_binding_lifecycle(quiet: bool) -> Vec<TestResult> {
    section(quiet, "Binding Lifecycle");
    let mut results = Vec::new();
    let registry = KeyRegistry::new();
    let overlay = PauseOverlay::default();

    let cycles = 100;
    let mut bad_cycles = 0;
    for _ in 0..cycles {
        let mounted = overlay.mount(&registry, OverlayActions::noop());
        let while_mounted = registry.binding_count(keys::ESCAPE);
        mounted.unmount();
        let after = registry.binding_count(keys::ESCAPE);
        if while_mounted != 1 || after != 0 {
            bad_cycles += 1;
        }
    }
    results.push(TestResult {
        name: "lifecycle_one_then_zero".into(),
        passed: bad_cycles == 0,
        detail: format!("{}/{} cycles held 1 binding then 0", cycles - bad_cycles, cycles),
    });

    let recorder = Recorder::default();
    drop(overlay.mount(&registry, recorder.actions()));
    let _mounted = overlay.mount(&registry, recorder.actions());
    registry.dispatch(keys::ESCAPE);
    results.push(TestResult {
        name: "lifecycle_remount_fresh".into(),
        passed: registry.total_bindings() == 1 && recorder.count(MenuAction::Resume) == 1,
        detail: format!(
            "{} binding(s), {} resume(s) after remount + press",
            registry.total_bindings(),
            recorder.count(MenuAction::Resume)
        ),
    });

    results
}

// ── 3. Cancellation Key ─────────────────────────────────────────────────

fn validate_cancellation(quiet: bool) -> Vec<TestResult> {
    section(quiet, "Cancellation Key");
    let mut results = Vec::new();

    // mount → press → resume once
    let registry = KeyRegistry::new();
    let recorder = Recorder::default();
    let mounted = PauseOverlay::default().mount(&registry, recorder.actions());
    registry.dispatch(keys::ESCAPE);
    results.push(TestResult {
        name: "cancel_press_resumes_once".into(),
        passed: recorder.calls() == vec![MenuAction::Resume],
        detail: format!("calls: {:?}", recorder.calls()),
    });

    // more presses, no debouncing
    for _ in 0..9 {
        registry.dispatch(keys::ESCAPE);
    }
    results.push(TestResult {
        name: "cancel_once_per_press".into(),
        passed: recorder.count(MenuAction::Resume) == 10,
        detail: format!("{} resumes for 10 presses", recorder.count(MenuAction::Resume)),
    });

    // mount → unmount → press → nothing
    mounted.unmount();
    let invoked = registry.dispatch(keys::ESCAPE);
    results.push(TestResult {
        name: "cancel_after_unmount_silent".into(),
        passed: invoked == 0 && recorder.count(MenuAction::Resume) == 10,
        detail: format!("{} handler(s) ran after unmount", invoked),
    });

    // unwinding out of a mounted scope still unbinds
    let inner = registry.clone();
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _mounted = PauseOverlay::default().mount(&inner, OverlayActions::noop());
        panic!("simulated render failure");
    }));
    std::panic::set_hook(hook);
    results.push(TestResult {
        name: "cancel_released_on_unwind".into(),
        passed: unwound.is_err() && registry.total_bindings() == 0,
        detail: format!("{} binding(s) left after panic", registry.total_bindings()),
    });

    results
}

// ── 4. Menu Routing ─────────────────────────────────────────────────────

fn validate_routing(quiet: bool) -> Vec<TestResult> {
    section(quiet, "Menu Routing");
    let mut results = Vec::new();

    for action in MenuAction::ALL {
        let registry = KeyRegistry::new();
        let recorder = Recorder::default();
        let mounted = PauseOverlay::default().mount(&registry, recorder.actions());
        mounted.select(action);
        results.push(TestResult {
            name: format!("routing_{:?}", action).to_lowercase(),
            passed: recorder.calls() == vec![action],
            detail: format!("selected {:?}, saw {:?}", action, recorder.calls()),
        });
    }

    results
}

// ── 5. Host Sweep ───────────────────────────────────────────────────────

fn validate_host_sweep(quiet: bool, verbose: bool) -> Vec<TestResult> {
    section(quiet, "Host Sweep");
    let mut results = Vec::new();

    let registry = KeyRegistry::new();
    let recorder = Recorder::default();
    let mut host = OverlayHost::new(registry.clone(), PauseOverlay::default());
    let mut rng = StdRng::seed_from_u64(HOST_SWEEP_SEED);

    let mut expected_resumes = 0;
    let mut violations = 0;
    let mut opens = 0;

    for step in 0..HOST_SWEEP_STEPS {
        match rng.gen_range(0..5) {
            0 => {
                if host.open(recorder.actions()) {
                    opens += 1;
                }
            }
            1 => {
                host.close();
            }
            2 => {
                if host.is_open() {
                    expected_resumes += 1;
                }
                registry.dispatch(keys::ESCAPE);
            }
            3 => {
                if host.toggle(|| recorder.actions()) == OverlayState::Open {
                    opens += 1;
                }
            }
            _ => {
                if host.select(MenuAction::Resume) {
                    expected_resumes += 1;
                }
            }
        }

        let want = usize::from(host.state() == OverlayState::Open);
        if registry.binding_count(keys::ESCAPE) != want {
            violations += 1;
            if verbose && !quiet {
                println!(
                    "    step {}: state {:?} but {} binding(s)",
                    step,
                    host.state(),
                    registry.binding_count(keys::ESCAPE)
                );
            }
        }
    }

    results.push(TestResult {
        name: "host_binding_matches_state".into(),
        passed: violations == 0,
        detail: format!(
            "{} steps, {} opens, {} violations",
            HOST_SWEEP_STEPS, opens, violations
        ),
    });
    results.push(TestResult {
        name: "host_resume_count".into(),
        passed: recorder.count(MenuAction::Resume) == expected_resumes,
        detail: format!(
            "expected {} resumes, saw {}",
            expected_resumes,
            recorder.count(MenuAction::Resume)
        ),
    });

    host.close();
    results.push(TestResult {
        name: "host_clean_shutdown".into(),
        passed: registry.total_bindings() == 0,
        detail: format!("{} binding(s) after final close", registry.total_bindings()),
    });

    results
}
