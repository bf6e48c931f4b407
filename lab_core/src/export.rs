//! # Export
//!
//! Renders synthesized curves as CSV (spreadsheet-friendly, full float
//! precision) or as a LaTeX `tabular` (paper-friendly, two decimals).
//! Samples past fracture render as empty cells so the truncation point
//! stays visible in the exported data.

use crate::flexure::FlexureCurve;
use crate::simulation::{Curve, TestMode};

/// Render a curve as CSV text.
///
/// The strain column is named for the mode's axis semantics: `strain_mm_mm`
/// for tension/compression, `shear_angle_rad` for torsion. The
/// `strain_display` column carries percent (axial modes) or radians
/// (torsion), matching what the dashboard plots.
pub fn curve_to_csv(curve: &Curve) -> String {
    let mut out = String::new();
    out.push_str(strain_header(curve.mode));
    out.push_str(",stress_mpa,strain_display\n");

    for p in &curve.points {
        match p.stress_mpa {
            Some(stress) => {
                out.push_str(&format!("{},{},{}\n", p.strain, stress, p.strain_display))
            }
            None => out.push_str(&format!("{},,{}\n", p.strain, p.strain_display)),
        }
    }

    out
}

/// Render a curve as a LaTeX `tabular` with two-decimal formatting.
pub fn curve_to_latex(curve: &Curve) -> String {
    let mut out = String::new();
    out.push_str("\\begin{tabular}{rrr}\n\\toprule\n");
    out.push_str(&format!(
        "{} & stress (MPa) & {} \\\\\n\\midrule\n",
        strain_label(curve.mode),
        display_label(curve.mode)
    ));

    for p in &curve.points {
        match p.stress_mpa {
            Some(stress) => out.push_str(&format!(
                "{:.6} & {:.2} & {:.2} \\\\\n",
                p.strain, stress, p.strain_display
            )),
            None => out.push_str(&format!(
                "{:.6} &  & {:.2} \\\\\n",
                p.strain, p.strain_display
            )),
        }
    }

    out.push_str("\\bottomrule\n\\end{tabular}\n");
    out
}

/// Render a force-deflection curve as CSV text.
pub fn flexure_to_csv(curve: &FlexureCurve) -> String {
    let mut out = String::from("deflection_mm,force_n\n");
    for p in &curve.points {
        match p.force_n {
            Some(force) => out.push_str(&format!("{},{}\n", p.deflection_mm, force)),
            None => out.push_str(&format!("{},\n", p.deflection_mm)),
        }
    }
    out
}

fn strain_header(mode: TestMode) -> &'static str {
    match mode {
        TestMode::Torsion => "shear_angle_rad",
        TestMode::Tension | TestMode::Compression => "strain_mm_mm",
    }
}

fn strain_label(mode: TestMode) -> &'static str {
    match mode {
        TestMode::Torsion => "shear angle (rad)",
        TestMode::Tension | TestMode::Compression => "strain (mm/mm)",
    }
}

fn display_label(mode: TestMode) -> &'static str {
    match mode {
        TestMode::Torsion => "angle (rad)",
        TestMode::Tension | TestMode::Compression => "strain (\\%)",
    }
}
