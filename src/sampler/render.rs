use serde::Serialize;

use super::compare::{Trend, compare};
use crate::format::{format_cpu_time, format_kib, format_start_time};
use crate::system::ResourceSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    WorkingSet,
    UserCpu,
    PrivilegedCpu,
    TotalCpu,
    PagedSystemMemory,
    PagedMemory,
}

impl FieldKind {
    /// Display order.
    pub const ALL: [FieldKind; 6] = [
        FieldKind::WorkingSet,
        FieldKind::UserCpu,
        FieldKind::PrivilegedCpu,
        FieldKind::TotalCpu,
        FieldKind::PagedSystemMemory,
        FieldKind::PagedMemory,
    ];

    pub fn is_bytes(self) -> bool {
        matches!(
            self,
            FieldKind::WorkingSet | FieldKind::PagedSystemMemory | FieldKind::PagedMemory
        )
    }

    fn trend(self, new: &ResourceSnapshot, old: &ResourceSnapshot) -> Trend {
        match self {
            FieldKind::WorkingSet => compare(new.working_set_bytes, old.working_set_bytes),
            FieldKind::UserCpu => compare(new.user_cpu_time, old.user_cpu_time),
            FieldKind::PrivilegedCpu => compare(new.privileged_cpu_time, old.privileged_cpu_time),
            FieldKind::TotalCpu => compare(new.total_cpu_time, old.total_cpu_time),
            FieldKind::PagedSystemMemory => compare(
                new.paged_system_memory_bytes,
                old.paged_system_memory_bytes,
            ),
            FieldKind::PagedMemory => compare(new.paged_memory_bytes, old.paged_memory_bytes),
        }
    }

    fn text(self, snapshot: &ResourceSnapshot) -> String {
        match self {
            FieldKind::WorkingSet => format_kib(snapshot.working_set_bytes),
            FieldKind::UserCpu => format_cpu_time(snapshot.user_cpu_time),
            FieldKind::PrivilegedCpu => format_cpu_time(snapshot.privileged_cpu_time),
            FieldKind::TotalCpu => format_cpu_time(snapshot.total_cpu_time),
            FieldKind::PagedSystemMemory => format_kib(snapshot.paged_system_memory_bytes),
            FieldKind::PagedMemory => format_kib(snapshot.paged_memory_bytes),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub kind: FieldKind,
    pub text: String,
    /// `None` when there is no previous sample to compare against.
    pub trend: Option<Trend>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    pub start_time: String,
    pub fields: [RenderedField; 6],
}

impl RenderedLine {
    pub fn field(&self, kind: FieldKind) -> &RenderedField {
        &self.fields[kind as usize]
    }

    pub fn is_initial(&self) -> bool {
        self.fields.iter().all(|f| f.trend.is_none())
    }
}

pub fn render(snapshot: &ResourceSnapshot, previous: Option<&ResourceSnapshot>) -> RenderedLine {
    RenderedLine {
        start_time: format_start_time(snapshot.start_time),
        fields: FieldKind::ALL.map(|kind| RenderedField {
            kind,
            text: kind.text(snapshot),
            trend: previous.map(|old| kind.trend(snapshot, old)),
        }),
    }
}
