//! `zfs get`-style property table output.
//!
//! A [`GetCallback`] carries the column layout and filter for one listing.
//! [`print_one_property`] emits a row, printing headers first on the first
//! call.

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetColumn {
    Name,
    Property,
    Value,
    Source,
}

impl GetColumn {
    fn title(self) -> &'static str {
        match self {
            GetColumn::Name => "NAME",
            GetColumn::Property => "PROPERTY",
            GetColumn::Value => "VALUE",
            GetColumn::Source => "SOURCE",
        }
    }

    fn idx(self) -> usize {
        match self {
            GetColumn::Name => 0,
            GetColumn::Property => 1,
            GetColumn::Value => 2,
            GetColumn::Source => 3,
        }
    }
}

/// Where a property value came from. The discriminants are filter bits.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    None = 0x1,
    Default = 0x2,
    Temporary = 0x4,
    Local = 0x8,
    Inherited = 0x10,
}

impl SourceType {
    pub const ALL: u32 = 0x1f;

    #[inline]
    pub fn bit(self) -> u32 {
        self as u32
    }
}

/// One property requested for display, used to size the columns.
#[derive(Debug, Clone)]
pub struct PropListEntry {
    pub name: String,
    /// Widest value seen for this property.
    pub width: usize,
    /// True for the pseudo-property naming the dataset itself.
    pub is_name: bool,
    /// Set when the list came from `all`.
    pub all: bool,
}

impl PropListEntry {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self { name: name.into(), width, is_name: false, all: false }
    }
}

#[derive(Debug, Clone)]
pub struct GetCallback {
    /// Bitmask of [`SourceType`] values to show.
    pub sources: u32,
    pub columns: Vec<GetColumn>,
    pub scripted: bool,
    pub proplist: Vec<PropListEntry>,
    colwidths: [usize; 4],
    first: bool,
}

impl GetCallback {
    /// At most four columns are used; extras are ignored.
    pub fn new(columns: &[GetColumn], proplist: Vec<PropListEntry>) -> Self {
        Self {
            sources: SourceType::ALL,
            columns: columns.iter().copied().take(4).collect(),
            scripted: false,
            proplist,
            colwidths: [0; 4],
            first: true,
        }
    }

    pub fn sources(mut self, mask: u32) -> Self {
        self.sources = mask;
        self
    }

    pub fn scripted(mut self, on: bool) -> Self {
        self.scripted = on;
        self
    }

    pub fn column_width(&self, col: GetColumn) -> usize {
        self.colwidths[col.idx()]
    }

    fn compute_widths(&mut self) {
        let mut w = [0usize; 4];
        for col in [GetColumn::Name, GetColumn::Property, GetColumn::Value, GetColumn::Source] {
            w[col.idx()] = col.title().len();
        }
        let inherited_from = "inherited from".len();

        for pl in &self.proplist {
            w[GetColumn::Property.idx()] = w[GetColumn::Property.idx()].max(pl.name.len());

            // The value column can end up wider than any actual value.
            if (!pl.is_name || !pl.all) && pl.width > w[GetColumn::Value.idx()] {
                w[GetColumn::Value.idx()] = pl.width;
            }

            // Source is sized for the worst case of inheriting from the
            // longest name.
            if pl.is_name && pl.width > w[GetColumn::Name.idx()] {
                w[GetColumn::Name.idx()] = pl.width;
                w[GetColumn::Source.idx()] = pl.width + inherited_from;
            }
        }
        self.colwidths = w;
    }

    fn print_headers(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.first = false;
        if self.scripted {
            return Ok(());
        }
        self.compute_widths();

        let last = self.columns.len().saturating_sub(1);
        for (i, col) in self.columns.iter().enumerate() {
            if i == last {
                write!(out, "{}", col.title())?;
            } else {
                write!(out, "{:<width$}  ", col.title(), width = self.colwidths[col.idx()])?;
            }
        }
        writeln!(out)
    }
}

/// Print one row of a property listing.
///
/// Rows whose source type is filtered out by `cb.sources` are skipped
/// entirely, including the header that would otherwise precede them.
pub fn print_one_property(
    out: &mut impl Write,
    cb: &mut GetCallback,
    name: &str,
    propname: &str,
    value: &str,
    source_type: SourceType,
    source: &str,
) -> io::Result<()> {
    if source_type.bit() & cb.sources == 0 {
        return Ok(());
    }
    if cb.first {
        cb.print_headers(out)?;
    }

    let last = cb.columns.len().saturating_sub(1);
    for (i, col) in cb.columns.iter().enumerate() {
        let cell = match col {
            GetColumn::Name => name.to_string(),
            GetColumn::Property => propname.to_string(),
            GetColumn::Value => value.to_string(),
            GetColumn::Source => match source_type {
                SourceType::None => "-".to_string(),
                SourceType::Default => "default".to_string(),
                SourceType::Local => "local".to_string(),
                SourceType::Temporary => "temporary".to_string(),
                SourceType::Inherited => format!("inherited from {}", source),
            },
        };

        if i == last {
            write!(out, "{}", cell)?;
        } else if cb.scripted {
            write!(out, "{}\t", cell)?;
        } else {
            write!(out, "{:<width$}  ", cell, width = cb.colwidths[col.idx()])?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_columns() -> Vec<GetColumn> {
        vec![GetColumn::Name, GetColumn::Property, GetColumn::Value, GetColumn::Source]
    }

    fn render(cb: &mut GetCallback, rows: &[(&str, &str, &str, SourceType, &str)]) -> String {
        let mut out = Vec::new();
        for (n, p, v, st, s) in rows {
            print_one_property(&mut out, cb, n, p, v, *st, s).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scripted_rows_are_tab_separated_without_header() {
        let mut cb = GetCallback::new(&all_columns(), vec![]).scripted(true);
        let s = render(
            &mut cb,
            &[
                ("tank", "compression", "on", SourceType::Local, ""),
                ("tank/a", "compression", "on", SourceType::Inherited, "tank"),
            ],
        );
        assert_eq!(
            s,
            "tank\tcompression\ton\tlocal\ntank/a\tcompression\ton\tinherited from tank\n"
        );
    }

    #[test]
    fn header_printed_once_with_widths() {
        let props = vec![PropListEntry::new("compression", 3)];
        let mut cb = GetCallback::new(&all_columns(), props);
        let s = render(
            &mut cb,
            &[
                ("tank", "compression", "off", SourceType::Default, ""),
                ("tank", "compression", "on", SourceType::None, ""),
            ],
        );
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "NAME  PROPERTY     VALUE  SOURCE");
        assert_eq!(lines[1], "tank  compression  off    default");
        assert_eq!(lines[2], "tank  compression  on     -");
        assert_eq!(cb.column_width(GetColumn::Property), "compression".len());
    }

    #[test]
    fn name_width_stretches_source() {
        let mut name = PropListEntry::new("name", 12);
        name.is_name = true;
        let mut cb = GetCallback::new(&all_columns(), vec![name]);
        render(&mut cb, &[("tank/home/me", "name", "x", SourceType::None, "")]);
        assert_eq!(cb.column_width(GetColumn::Name), 12);
        assert_eq!(cb.column_width(GetColumn::Source), 12 + "inherited from".len());
    }

    #[test]
    fn filtered_source_prints_nothing() {
        let mut cb = GetCallback::new(&all_columns(), vec![]).sources(SourceType::Local.bit());
        let s = render(&mut cb, &[("tank", "atime", "on", SourceType::Default, "")]);
        assert!(s.is_empty());
        // Header still pending for the first visible row.
        let s = render(&mut cb, &[("tank", "atime", "on", SourceType::Local, "")]);
        assert!(s.starts_with("NAME"));
    }

    #[test]
    fn single_column_is_unpadded() {
        let mut cb = GetCallback::new(&[GetColumn::Value], vec![]);
        let s = render(&mut cb, &[("tank", "used", "1.50K", SourceType::None, "")]);
        assert_eq!(s, "VALUE\n1.50K\n");
    }
}
