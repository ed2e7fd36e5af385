// Test-only MAT v4 writer for building result containers in memory

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

const DOUBLE: i32 = 0;
const INT32: i32 = 2;
const UINT8: i32 = 5;

pub struct MatBuilder {
    bytes: Vec<u8>,
    big_endian: bool,
    transposed: bool,
}

impl MatBuilder {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            big_endian: false,
            transposed: true,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Store logical columns as rows and announce "binNormal"
    pub fn normal_layout(mut self) -> Self {
        self.transposed = false;
        self
    }

    pub fn aclass(mut self) -> Self {
        let layout = if self.transposed { "binTrans" } else { "binNormal" };
        let rows = ["Atrajectory", "1.1", "", layout];
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut data = Vec::new();
        for j in 0..width {
            for row in rows {
                data.push(row.as_bytes().get(j).copied().unwrap_or(0) as f64);
            }
        }
        self.write("Aclass", UINT8, 1, 4, width, &data);
        self
    }

    pub fn text(mut self, label: &str, strings: &[&str]) -> Self {
        let width = strings.iter().map(|s| s.len()).max().unwrap_or(0);
        let columns: Vec<Vec<f64>> = strings
            .iter()
            .map(|s| {
                let mut codes: Vec<f64> = s.bytes().map(f64::from).collect();
                codes.resize(width, 0.0);
                codes
            })
            .collect();
        self.logical(label, UINT8, 1, &columns);
        self
    }

    pub fn ints(mut self, label: &str, columns: &[Vec<i32>]) -> Self {
        let columns: Vec<Vec<f64>> = columns
            .iter()
            .map(|c| c.iter().map(|&v| v as f64).collect())
            .collect();
        self.logical(label, INT32, 0, &columns);
        self
    }

    pub fn doubles(mut self, label: &str, columns: &[Vec<f64>]) -> Self {
        self.logical(label, DOUBLE, 0, columns);
        self
    }

    /// Append raw bytes (e.g. garbage after the interesting part)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    fn logical(&mut self, label: &str, precision: i32, kind: i32, columns: &[Vec<f64>]) {
        let count = columns.len();
        let len = columns.first().map(|c| c.len()).unwrap_or(0);
        if self.transposed {
            let data: Vec<f64> = columns.iter().flatten().copied().collect();
            self.write(label, precision, kind, len, count, &data);
        } else {
            let mut data = Vec::with_capacity(count * len);
            for j in 0..len {
                for column in columns {
                    data.push(column[j]);
                }
            }
            self.write(label, precision, kind, count, len, &data);
        }
    }

    fn write(&mut self, label: &str, precision: i32, kind: i32, rows: usize, cols: usize, data: &[f64]) {
        if self.big_endian {
            write_matrix::<BigEndian>(&mut self.bytes, 1, label, precision, kind, rows, cols, data);
        } else {
            write_matrix::<LittleEndian>(&mut self.bytes, 0, label, precision, kind, rows, cols, data);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn write_matrix<B: byteorder::ByteOrder>(
    out: &mut Vec<u8>,
    machine: i32,
    label: &str,
    precision: i32,
    kind: i32,
    rows: usize,
    cols: usize,
    data: &[f64],
) {
    assert_eq!(data.len(), rows * cols);
    let mopt = machine * 1000 + precision * 10 + kind;
    for v in [mopt, rows as i32, cols as i32, 0, label.len() as i32 + 1] {
        out.write_i32::<B>(v).unwrap();
    }
    out.extend_from_slice(label.as_bytes());
    out.push(0);
    for &v in data {
        match precision {
            DOUBLE => out.write_f64::<B>(v).unwrap(),
            INT32 => out.write_i32::<B>(v as i32).unwrap(),
            UINT8 => out.write_u8(v as u8).unwrap(),
            _ => unreachable!(),
        }
    }
}

/// A small tank model:
///
/// | # | name         | dataInfo      | storage                    |
/// |---|--------------|---------------|----------------------------|
/// | 1 | time         | [0, 1, 0, -1] | data_2 column 1            |
/// | 2 | tank.level   | [2, 2, 0, -1] | data_2 column 2            |
/// | 3 | tank.area    | [1, 2, 0, 0]  | data_1 column 2            |
/// | 4 | tank.outflow | [2, -3, 0, -1]| negated data_2 column 3    |
/// | 5 | pipe.m_flow  | [2, 3, 0, -1] | data_2 column 3            |
pub fn tank_model(builder: MatBuilder) -> MatBuilder {
    builder
        .aclass()
        .text("name", &["time", "tank.level", "tank.area", "tank.outflow", "pipe.m_flow"])
        .text(
            "description",
            &["Simulation time [s]", "Fill level [m]", "Base area [m2]", "Outflow", "Mass flow rate [kg/s]"],
        )
        .ints(
            "dataInfo",
            &[
                vec![0, 1, 0, -1],
                vec![2, 2, 0, -1],
                vec![1, 2, 0, 0],
                vec![2, -3, 0, -1],
                vec![2, 3, 0, -1],
            ],
        )
        .doubles("data_1", &[vec![0.0, 2.5], vec![10.0, 2.5]])
        .doubles(
            "data_2",
            &[vec![0.0, 1.0, 0.5], vec![5.0, 1.5, 0.25], vec![10.0, 1.8, 0.1]],
        )
}
