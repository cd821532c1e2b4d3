//! Standard directory layout derivation
//!
//! A pure function from five base settings to the full derived-path map.
//! No I/O happens here and no directory is created; materializing the
//! layout on disk belongs to the caller.

use crate::calendar::CalendarComponents;
use crate::platform::OsFamily;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Segment inserted under the base directory while the debug flag is set
pub const DEBUG_SEGMENT: &str = "debug";

/// The five inputs the layout derives from
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInputs {
    /// Base directory already selected for the target family
    pub base_dir: String,
    /// Project name segment
    pub project_name: String,
    /// Experiment name segment
    pub experiment_name: String,
    /// Debug flag; inserts a `debug` segment between base and project
    pub debug: bool,
    /// Reference timestamp for the calendar-derived subtrees
    pub timestamp: NaiveDateTime,
}

/// The derived directory map
///
/// Every path is a descendant of `work_dir`, and `work_dir` is a descendant
/// of the selected base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutDescriptor {
    /// `base[/debug]/project/experiment`
    pub work_dir: String,
    /// `work/checkpoint`
    pub checkpoint_dir: String,
    /// `work/checkpoint/best`
    pub best_checkpoint_dir: String,
    /// `work/debug`
    pub debug_dir: String,
    /// `work/tsb_logs/<iso year>/<iso week>/<monthday>/<time>`
    pub tsb_logs_dir: String,
    /// `work/logs/<monthday>/<time>`
    pub log_dir: String,
    /// `work/backup/<monthday>/<time>`
    pub backup_dir: String,
}

/// Join `segments` under `base` with the family's native separator
///
/// Trailing separators on `base` are folded so `"/srv/"` and `"/srv"` yield
/// the same result.
#[must_use]
pub fn join_under(family: OsFamily, base: &str, segments: &[&str]) -> String {
    let sep = family.separator();
    let mut out = base.trim_end_matches(['/', '\\']).to_string();
    for segment in segments {
        out.push(sep);
        out.push_str(segment);
    }
    out
}

/// Build the layout for `family` from the five inputs
#[must_use]
pub fn build_layout(inputs: &LayoutInputs, family: OsFamily) -> LayoutDescriptor {
    let mut work_segments: Vec<&str> = Vec::with_capacity(3);
    if inputs.debug {
        work_segments.push(DEBUG_SEGMENT);
    }
    work_segments.push(&inputs.project_name);
    work_segments.push(&inputs.experiment_name);
    let work_dir = join_under(family, &inputs.base_dir, &work_segments);

    let calendar = CalendarComponents::from_timestamp(inputs.timestamp);
    let checkpoint_dir = join_under(family, &work_dir, &["checkpoint"]);

    LayoutDescriptor {
        best_checkpoint_dir: join_under(family, &checkpoint_dir, &["best"]),
        debug_dir: join_under(family, &work_dir, &[DEBUG_SEGMENT]),
        tsb_logs_dir: join_under(
            family,
            &work_dir,
            &[
                "tsb_logs",
                &calendar.year,
                &calendar.week,
                &calendar.monthday,
                &calendar.time,
            ],
        ),
        log_dir: join_under(
            family,
            &work_dir,
            &["logs", &calendar.monthday, &calendar.time],
        ),
        backup_dir: join_under(
            family,
            &work_dir,
            &["backup", &calendar.monthday, &calendar.time],
        ),
        checkpoint_dir,
        work_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 7)
            .unwrap()
            .and_hms_opt(18, 15, 20)
            .unwrap()
    }

    fn inputs(debug: bool) -> LayoutInputs {
        LayoutInputs {
            base_dir: "/srv/app".to_string(),
            project_name: "proj".to_string(),
            experiment_name: "exp1".to_string(),
            debug,
            timestamp: reference(),
        }
    }

    #[test]
    fn production_layout() {
        let layout = build_layout(&inputs(false), OsFamily::UnixLike);
        assert_eq!(layout.work_dir, "/srv/app/proj/exp1");
        assert_eq!(layout.checkpoint_dir, "/srv/app/proj/exp1/checkpoint");
        assert_eq!(layout.best_checkpoint_dir, "/srv/app/proj/exp1/checkpoint/best");
        assert_eq!(layout.debug_dir, "/srv/app/proj/exp1/debug");
        assert_eq!(layout.log_dir, "/srv/app/proj/exp1/logs/0107/181520");
        assert_eq!(layout.backup_dir, "/srv/app/proj/exp1/backup/0107/181520");
        assert_eq!(
            layout.tsb_logs_dir,
            "/srv/app/proj/exp1/tsb_logs/2025/02/0107/181520",
        );
    }

    #[test]
    fn debug_flag_inserts_segment_before_project() {
        let layout = build_layout(&inputs(true), OsFamily::UnixLike);
        assert_eq!(layout.work_dir, "/srv/app/debug/proj/exp1");
    }

    #[test]
    fn windows_family_joins_with_backslashes() {
        let mut i = inputs(false);
        i.base_dir = "d:\\logs".to_string();
        let layout = build_layout(&i, OsFamily::Windows);
        assert_eq!(layout.work_dir, "d:\\logs\\proj\\exp1");
        assert_eq!(layout.checkpoint_dir, "d:\\logs\\proj\\exp1\\checkpoint");
    }

    #[test]
    fn trailing_separator_on_base_is_folded() {
        let mut i = inputs(false);
        i.base_dir = "/srv/app/".to_string();
        let layout = build_layout(&i, OsFamily::UnixLike);
        assert_eq!(layout.work_dir, "/srv/app/proj/exp1");
    }

    #[test]
    fn every_derived_path_descends_from_work_dir() {
        let layout = build_layout(&inputs(true), OsFamily::UnixLike);
        for path in [
            &layout.checkpoint_dir,
            &layout.best_checkpoint_dir,
            &layout.debug_dir,
            &layout.tsb_logs_dir,
            &layout.log_dir,
            &layout.backup_dir,
        ] {
            assert!(path.starts_with(&layout.work_dir), "{path} outside work dir");
        }
        assert!(layout.work_dir.starts_with("/srv/app"));
    }
}
