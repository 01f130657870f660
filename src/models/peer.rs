use chrono::NaiveDateTime;

/// A BGP session as reported by `show protocols all`.
///
/// Detail fields are `None` when BIRD did not print them, e.g. for sessions that never came up.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peer {
    pub name: String,
    pub protocol: String,
    pub table: String,
    /// Explicit session state (`Established`, `Passive`, `Connect`, ...).
    pub state: Option<String>,
    pub up: bool,
    pub last_change: NaiveDateTime,

    pub description: Option<String>,
    pub router_id: Option<String>,
    pub address: Option<String>,
    pub source_address: Option<String>,
    pub asn: Option<u32>,
    pub bgp_state: Option<String>,
    pub preference: Option<u32>,
    pub input_filter: Option<String>,
    pub output_filter: Option<String>,

    pub routes_imported: Option<u64>,
    pub routes_filtered: Option<u64>,
    pub routes_exported: Option<u64>,
    pub routes_preferred: Option<u64>,

    pub route_changes: RouteChangeStats,
}

/// Rows of the `Route change stats` table, in the order BIRD prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsRow {
    ImportUpdates,
    ImportWithdraws,
    ExportUpdates,
    ExportWithdraws,
}

impl StatsRow {
    pub const ALL: [StatsRow; 4] = [
        StatsRow::ImportUpdates,
        StatsRow::ImportWithdraws,
        StatsRow::ExportUpdates,
        StatsRow::ExportWithdraws,
    ];

    /// Matches the lower-cased detail label, e.g. `import updates`.
    pub fn from_label(label: &str) -> Option<StatsRow> {
        match label {
            "import updates" => Some(StatsRow::ImportUpdates),
            "import withdraws" => Some(StatsRow::ImportWithdraws),
            "export updates" => Some(StatsRow::ExportUpdates),
            "export withdraws" => Some(StatsRow::ExportWithdraws),
            _ => None,
        }
    }

    const fn index(&self) -> usize {
        match self {
            StatsRow::ImportUpdates => 0,
            StatsRow::ImportWithdraws => 1,
            StatsRow::ExportUpdates => 2,
            StatsRow::ExportWithdraws => 3,
        }
    }
}

/// Columns of the `Route change stats` table, in the order BIRD prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsColumn {
    Received,
    Rejected,
    Filtered,
    Ignored,
    Accepted,
}

impl StatsColumn {
    pub const ALL: [StatsColumn; 5] = [
        StatsColumn::Received,
        StatsColumn::Rejected,
        StatsColumn::Filtered,
        StatsColumn::Ignored,
        StatsColumn::Accepted,
    ];

    const fn index(&self) -> usize {
        match self {
            StatsColumn::Received => 0,
            StatsColumn::Rejected => 1,
            StatsColumn::Filtered => 2,
            StatsColumn::Ignored => 3,
            StatsColumn::Accepted => 4,
        }
    }
}

/// Flat field names of every counter, indexed by `[row][column]`.
pub const COUNTER_FIELDS: [[&str; 5]; 4] = [
    [
        "import_updates_received",
        "import_updates_rejected",
        "import_updates_filtered",
        "import_updates_ignored",
        "import_updates_accepted",
    ],
    [
        "import_withdraws_received",
        "import_withdraws_rejected",
        "import_withdraws_filtered",
        "import_withdraws_ignored",
        "import_withdraws_accepted",
    ],
    [
        "export_updates_received",
        "export_updates_rejected",
        "export_updates_filtered",
        "export_updates_ignored",
        "export_updates_accepted",
    ],
    [
        "export_withdraws_received",
        "export_withdraws_rejected",
        "export_withdraws_filtered",
        "export_withdraws_ignored",
        "export_withdraws_accepted",
    ],
];

pub const fn counter_field(row: StatsRow, column: StatsColumn) -> &'static str {
    COUNTER_FIELDS[row.index()][column.index()]
}

/// One row of the route change statistics. A `---` cell is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteChangeCounters {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub received: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub rejected: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub filtered: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub ignored: Option<u64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub accepted: Option<u64>,
}

impl RouteChangeCounters {
    pub fn get(&self, column: StatsColumn) -> Option<u64> {
        match column {
            StatsColumn::Received => self.received,
            StatsColumn::Rejected => self.rejected,
            StatsColumn::Filtered => self.filtered,
            StatsColumn::Ignored => self.ignored,
            StatsColumn::Accepted => self.accepted,
        }
    }

    pub fn set(&mut self, column: StatsColumn, value: Option<u64>) {
        let slot = match column {
            StatsColumn::Received => &mut self.received,
            StatsColumn::Rejected => &mut self.rejected,
            StatsColumn::Filtered => &mut self.filtered,
            StatsColumn::Ignored => &mut self.ignored,
            StatsColumn::Accepted => &mut self.accepted,
        };
        *slot = value;
    }
}

/// The `Route change stats` table of a protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteChangeStats {
    pub import_updates: RouteChangeCounters,
    pub import_withdraws: RouteChangeCounters,
    pub export_updates: RouteChangeCounters,
    pub export_withdraws: RouteChangeCounters,
}

impl RouteChangeStats {
    pub fn row(&self, row: StatsRow) -> &RouteChangeCounters {
        match row {
            StatsRow::ImportUpdates => &self.import_updates,
            StatsRow::ImportWithdraws => &self.import_withdraws,
            StatsRow::ExportUpdates => &self.export_updates,
            StatsRow::ExportWithdraws => &self.export_withdraws,
        }
    }

    pub fn row_mut(&mut self, row: StatsRow) -> &mut RouteChangeCounters {
        match row {
            StatsRow::ImportUpdates => &mut self.import_updates,
            StatsRow::ImportWithdraws => &mut self.import_withdraws,
            StatsRow::ExportUpdates => &mut self.export_updates,
            StatsRow::ExportWithdraws => &mut self.export_withdraws,
        }
    }

    /// Look up a counter by its flat name, e.g. `import_updates_received`.
    pub fn get(&self, field: &str) -> Option<u64> {
        self.counters()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Iterates over the counters BIRD reported a number for, as `(field_name, value)`.
    pub fn counters(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        StatsRow::ALL.into_iter().flat_map(move |row| {
            StatsColumn::ALL.into_iter().filter_map(move |column| {
                self.row(row)
                    .get(column)
                    .map(|value| (counter_field(row, column), value))
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.counters().next().is_none()
    }
}
