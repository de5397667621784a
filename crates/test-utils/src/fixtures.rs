//! Small hand-checked FLO-2D inputs.

/// Four reference cells on the corners of a 100 x 100 square.
/// With a cell size of 50 the grid is 3 x 3.
pub const CORNER_CADPTS: &str = "\
1 0.0 0.0
2 100.0 0.0
3 0.0 100.0
4 100.0 100.0
";

/// Two blocks for cells 1 and 2. With a threshold of 0.3 the first block
/// populates only cell 1 and the second populates both.
pub const TWO_BLOCK_TIMDEP: &str = "1.0\n1 0.5\n2 0.05\n\n2.0\n1 0.6\n2 0.9\n";

/// Depth file with five value columns; column 5 is the surface elevation.
/// Cell 2 is missing from the second block.
pub const FLOOD_PLAIN_TIMDEP: &str = "\
0.50
1 0.10 0.0 0.0 0.0 5.10
2 0.20 0.0 0.0 0.0 6.20

1.00
1 0.15 0.0 0.0 0.0 5.15

1.50
1 0.12 0.0 0.0 0.0 5.12
2 0.22 0.0 0.0 0.0 n/a
";

/// Hydrograph report with three sections of three rows each. Element 179 has
/// a NaN elevation in its last row.
pub const HYCHAN_REPORT: &str = "\
 FLO-2D CHANNEL HYDROGRAPH OUTPUT

     CHANNEL HYDROGRAPH FOR ELEMENT NO:   179
     TIME   ELEVATION   DEPTH   VELOCITY   DISCHARGE
     (HRS)     (M)       (M)     (MPS)      (CMS)

      1.00     1.52      0.40     0.00       0.00
     13.00     1.60      0.48     0.10       1.20
     25.00      NaN      0.50     0.10       1.30

     CHANNEL HYDROGRAPH FOR ELEMENT NO:   220
     TIME   ELEVATION   DEPTH   VELOCITY   DISCHARGE
      1.00     2.10      1.00     0.00       0.00
     13.00     2.20      1.10     0.00       0.00
     25.00     2.30      1.20     0.00       0.00

     CHANNEL HYDROGRAPH FOR ELEMENT NO:   618
     TIME   ELEVATION   DEPTH   VELOCITY   DISCHARGE
      1.00     3.00      1.50     0.00       0.00
      13.00    3.10      1.60     0.00       0.00
      25.00    3.20      1.70     0.00       0.00
";

/// `MAXWSELEV.OUT` and `TOPO.DAT` for the corner cells.
pub const CORNER_MAXWSELEV: &str = "\
1 0.0 0.0 10.50
2 100.0 0.0 10.00
3 0.0 100.0 12.25
4 100.0 100.0 9.00
";

pub const CORNER_TOPO: &str = "\
0.0 0.0 10.00
100.0 0.0 10.00
0.0 100.0 11.00
100.0 100.0 8.90
";
