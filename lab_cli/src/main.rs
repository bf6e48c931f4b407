//! # Materium CLI
//!
//! Terminal driver for the virtual materials lab: pick a material from the
//! builtin catalog, pick a test mode, and get the simulated curve as a
//! summary table plus CSV for plotting elsewhere.

use std::io::{self, BufRead, Write};

use lab_core::export::curve_to_csv;
use lab_core::materials::builtin_catalog;
use lab_core::simulation::{simulate, TestInput, TestMode};

fn prompt_line(prompt: &str, default: &str) -> String {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default.to_string();
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_line(prompt, &default.to_string())
        .parse()
        .unwrap_or(default)
}

fn main() {
    env_logger::init();

    println!("Materium CLI - Virtual Materials Testing Lab");
    println!("============================================");
    println!();

    let catalog = builtin_catalog();
    println!("Available materials:");
    for record in catalog.all() {
        println!("  {}", record);
    }
    println!();

    let name = prompt_line("Material [Steel A36]: ", "Steel A36");
    let mode_label = prompt_line("Test mode (Tension/Compression/Torsion) [Tension]: ", "Tension");
    let mode = TestMode::from_label(&mode_label).unwrap_or(TestMode::Tension);
    let max_strain = prompt_f64("Machine strain limit [0.1]: ", 0.1);

    let material = match catalog.lookup(&name) {
        Ok(record) => record.clone(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("Simulating {} in {}...", material.name, mode);
    println!();

    let input = TestInput::new(material, mode, max_strain);

    match simulate(&input) {
        Ok(curve) => {
            println!("═══════════════════════════════════════");
            println!("  TEST RESULTS: {} ({})", curve.material, curve.mode);
            println!("═══════════════════════════════════════");
            println!();
            println!("Samples:   {}", curve.points.len());
            match curve.last_defined_strain() {
                Some(end) if curve.is_truncated() => {
                    println!("Fracture:  specimen failed at strain {:.4}", end)
                }
                _ => println!("Fracture:  none within machine travel"),
            }
            println!();

            let (strain_col, stress_col) = match mode {
                TestMode::Torsion => ("angle (rad)", "tau (MPa)"),
                _ => ("strain (%)", "sigma (MPa)"),
            };
            println!("{:>12} {:>12}", strain_col, stress_col);
            let step = (curve.points.len() / 10).max(1);
            for p in curve.points.iter().step_by(step) {
                match p.stress_mpa {
                    Some(stress) => println!("{:>12.4} {:>12.2}", p.strain_display, stress),
                    None => println!("{:>12.4} {:>12}", p.strain_display, "-"),
                }
            }

            println!();
            println!("CSV Output (for plotting/spreadsheets):");
            print!("{}", curve_to_csv(&curve));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    }
}
