//! Generators for synthetic FLO-2D model outputs.
//!
//! Values follow simple closed forms so tests can recompute them.

use std::fmt::Write;

/// Reference file for a `cols x rows` lattice of cells.
///
/// Cell ids run row by row from the south-west corner starting at 1, so cell
/// `id` sits at column `(id - 1) % cols` and southern band `(id - 1) / cols`.
pub fn generate_cadpts(cols: usize, rows: usize, cell_size: f64, origin: (f64, f64)) -> String {
    let mut out = String::new();
    for band in 0..rows {
        for col in 0..cols {
            let id = band * cols + col + 1;
            let x = origin.0 + col as f64 * cell_size;
            let y = origin.1 + band as f64 * cell_size;
            let _ = writeln!(out, "{:>8} {:>14.2} {:>14.2}", id, x, y);
        }
    }
    out
}

/// Depth value written for a cell at a block: `(id % 10) * 0.1 + block * 0.01`.
pub fn synthetic_depth(cell_id: u64, block: usize) -> f64 {
    (cell_id % 10) as f64 * 0.1 + block as f64 * 0.01
}

/// Time-stepped depth file with `blocks` blocks of `cells` records each.
///
/// Block `b` has model time `(b + 1) * step_hours`. Every record carries the
/// depth in column 1 and the depth plus 10 as elevation in column 5.
pub fn generate_timdep(cells: u64, blocks: usize, step_hours: f64) -> String {
    let mut out = String::new();
    for block in 0..blocks {
        let _ = writeln!(out, "{:>10.2}", (block + 1) as f64 * step_hours);
        for id in 1..=cells {
            let depth = synthetic_depth(id, block);
            let _ = writeln!(
                out,
                "{:>8} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                id,
                depth,
                0.0,
                0.0,
                0.0,
                depth + 10.0
            );
        }
        out.push('\n');
    }
    out
}

/// Hydrograph report with one section per element and `rows` rows each.
///
/// Row `r` has time `(r + 1) * step_hours`, elevation `element + r * 0.01`
/// and depth `r * 0.1`.
pub fn generate_hychan(elements: &[u64], rows: usize, step_hours: f64) -> String {
    let mut out = String::from(" FLO-2D CHANNEL HYDROGRAPH OUTPUT\n\n");
    for element in elements {
        let _ = writeln!(out, "     CHANNEL HYDROGRAPH FOR ELEMENT NO: {:>6}", element);
        out.push_str("     TIME   ELEVATION   DEPTH   VELOCITY\n\n");
        for r in 0..rows {
            let _ = writeln!(
                out,
                "{:>10.2} {:>10.2} {:>9.2} {:>9.2}",
                (r + 1) as f64 * step_hours,
                *element as f64 + r as f64 * 0.01,
                r as f64 * 0.1,
                0.0
            );
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cadpts() {
        let text = generate_cadpts(3, 2, 10.0, (100.0, 200.0));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        let last: Vec<&str> = lines[5].split_whitespace().collect();
        assert_eq!(last, vec!["6", "120.00", "210.00"]);
    }

    #[test]
    fn test_generate_timdep_shape() {
        let text = generate_timdep(4, 3, 0.5);
        let frames = text
            .lines()
            .filter(|l| l.split_whitespace().count() == 1)
            .count();
        assert_eq!(frames, 3);
        assert_eq!(text.lines().filter(|l| l.trim().is_empty()).count(), 3);
    }

    #[test]
    fn test_generate_hychan_sections() {
        let text = generate_hychan(&[10, 20], 4, 1.0);
        assert_eq!(text.matches("CHANNEL HYDROGRAPH FOR ELEMENT NO:").count(), 2);
    }
}
