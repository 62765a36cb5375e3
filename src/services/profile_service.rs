/// Cross-section profiles: how depth, velocity or discharge vary along the
/// transect, one series per visit, newest first.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::measurement::{FlowPoint, Measurement};

pub const DISTANCE_AXIS_LABEL: &str = "DISTANCE ALONG SECTION, IN FEET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileVariable {
    Depth,
    Velocity,
    Discharge,
}

impl ProfileVariable {
    pub const ALL: [ProfileVariable; 3] = [
        ProfileVariable::Depth,
        ProfileVariable::Velocity,
        ProfileVariable::Discharge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProfileVariable::Depth => "Depth",
            ProfileVariable::Velocity => "Velocity",
            ProfileVariable::Discharge => "Discharge",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            ProfileVariable::Depth => "DEPTH, IN FEET",
            ProfileVariable::Velocity => "VELOCITY, IN FT/S",
            ProfileVariable::Discharge => "DISCHARGE, CFS",
        }
    }

    fn value(&self, point: &FlowPoint) -> f64 {
        match self {
            ProfileVariable::Depth => point.depth_ft,
            ProfileVariable::Velocity => point.velocity_fps,
            ProfileVariable::Discharge => point.discharge_cfs,
        }
    }
}

impl FromStr for ProfileVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileVariable::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown profile variable: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub distance_ft: f64,
    pub value: f64,
}

/// One visit's profile line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSeries {
    pub site_code: String,
    pub date_label: String,
    /// 1.0 for the newest visit, fading for older ones
    pub opacity: f64,
    pub points: Vec<ProfilePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSectionProfile {
    pub variable: ProfileVariable,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub series: Vec<ProfileSeries>,
}

/// One profile per requested variable over the given measurements
pub fn cross_section_profiles(
    measurements: &[Measurement],
    variables: &[ProfileVariable],
) -> Vec<CrossSectionProfile> {
    let mut newest_first: Vec<&Measurement> = measurements.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let fade = if newest_first.is_empty() {
        0.0
    } else {
        1.0 / newest_first.len() as f64
    };

    variables
        .iter()
        .map(|variable| CrossSectionProfile {
            variable: *variable,
            x_label: DISTANCE_AXIS_LABEL,
            y_label: variable.axis_label(),
            series: newest_first
                .iter()
                .enumerate()
                .map(|(idx, m)| ProfileSeries {
                    site_code: m.site_code.clone(),
                    date_label: m.date_label(),
                    opacity: 1.0 - idx as f64 * fade,
                    points: m
                        .flow_data
                        .iter()
                        .map(|s| ProfilePoint {
                            distance_ft: s.point.distance_ft,
                            value: variable.value(&s.point),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
