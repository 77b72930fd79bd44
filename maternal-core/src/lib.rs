//! Mô hình dữ liệu lõi cho hồ sơ thai sản, chỉ số sức khỏe và cảnh báo.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod time;

pub use time::{display_time, parse_date, store_time, to_datetime, Timestamp, NANOS_PER_MILLI};

/// Cấu hình ngưỡng rủi ro và nội dung cảnh báo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CareConfig {
    pub thresholds: RiskThresholds,
    /// Hành động khuyến nghị gắn vào mọi cảnh báo nguy cơ cao.
    pub recommended_action: String,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            recommended_action:
                "Immediate medical attention required. Contact healthcare provider.".to_string(),
        }
    }
}

/// Ngưỡng lâm sàng cho một lần đo.
///
/// Huyết áp tính theo mmHg, đường huyết theo mg/dL, hemoglobin theo g/dL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskThresholds {
    /// Tâm thu từ mức này trở lên là nguy cơ cao.
    pub systolic_at_or_above: f64,
    /// Tâm trương từ mức này trở lên là nguy cơ cao.
    pub diastolic_at_or_above: f64,
    /// Đường huyết vượt quá mức này là nguy cơ cao.
    pub blood_sugar_above: f64,
    /// Hemoglobin dưới mức này là nguy cơ cao.
    pub hemoglobin_below: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            systolic_at_or_above: 140.0,
            diastolic_at_or_above: 90.0,
            blood_sugar_above: 140.0,
            hemoglobin_below: 9.0,
        }
    }
}

/// Nhóm máu (8 giá trị cố định).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = CareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BloodType::ALL
            .into_iter()
            .find(|blood_type| blood_type.as_str() == value)
            .ok_or_else(|| CareError::Validation("Invalid blood type".to_string()))
    }
}

/// Tam cá nguyệt, mỗi giai đoạn 13 tuần.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    /// Phân loại theo số tuần thai đã hoàn thành.
    pub fn from_gestational_weeks(weeks: i64) -> Self {
        match weeks {
            w if w <= 13 => Trimester::First,
            w if w <= 26 => Trimester::Second,
            _ => Trimester::Third,
        }
    }

    /// Ước tính tam cá nguyệt từ ngày dự sinh (thai kỳ chuẩn 40 tuần).
    pub fn for_due_date(due_date: Timestamp, now: Timestamp) -> Self {
        let remaining = i128::from(due_date) - i128::from(now);
        let remaining_weeks = -(-remaining).div_euclid(NANOS_PER_WEEK);
        // u64 nanoseconds span well under i64::MAX weeks.
        Self::from_gestational_weeks((40 - remaining_weeks) as i64)
    }
}

const NANOS_PER_WEEK: i128 = 7 * 24 * 60 * 60 * 1_000_000_000;

/// Mức độ rủi ro dùng chung cho hồ sơ và cảnh báo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Nhóm phân quyền của nhân viên y tế. Chỉ là dữ liệu, không phải cơ chế xác thực.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    Admin,
    #[default]
    Provider,
}

/// Hồ sơ thai phụ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaternalProfile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub blood_type: BloodType,
    pub emergency_contact: String,
    pub due_date: Timestamp,
    pub current_trimester: Trimester,
    pub risk_level: RiskLevel,
    pub primary_care_provider_id: String,
    pub medical_history: Vec<String>,
    pub allergies: BTreeSet<String>,
    pub is_high_risk: bool,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

/// Nhân viên y tế.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthcareProvider {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    pub contact_info: String,
    pub facility_id: String,
    pub is_active: bool,
    pub role: ProviderRole,
    pub last_updated: Timestamp,
}

/// Một lần đo chỉ số sức khỏe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthMetrics {
    pub id: String,
    pub maternal_profile_id: String,
    pub recorded_at: Timestamp,
    pub weight: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub blood_sugar: Option<f64>,
    pub hemoglobin_level: Option<f64>,
    pub fetal_heart_rate: Option<f64>,
    pub notes: String,
    pub recorded_by: String,
    pub is_flagged_for_review: bool,
    /// Thứ tự ghi trong store, phân định các bản ghi cùng thời điểm.
    pub sequence: u64,
}

/// Lịch khám thai.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrenatalVisit {
    pub id: String,
    pub maternal_profile_id: String,
    pub provider_id: String,
    pub scheduled_date: Timestamp,
    pub completed: bool,
    pub visit_type: String,
    pub findings: String,
    pub recommendations: String,
    pub next_visit_date: Option<Timestamp>,
    pub prescriptions: Vec<String>,
    pub follow_up_required: bool,
    pub cancellation_reason: Option<String>,
    pub sequence: u64,
}

impl PrenatalVisit {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_reason.is_some()
    }
}

/// Cảnh báo sức khỏe gắn với một hồ sơ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthAlert {
    pub id: String,
    pub maternal_profile_id: String,
    pub created_at: Timestamp,
    pub severity: RiskLevel,
    pub description: String,
    pub recommended_action: String,
    pub is_resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub provider_id: String,
    pub resolution_notes: Option<String>,
    pub escalation_level: u8,
    pub sequence: u64,
}

impl HealthAlert {
    pub const MAX_ESCALATION_LEVEL: u8 = 3;

    pub fn is_open(&self) -> bool {
        !self.is_resolved
    }
}

/// Dữ liệu đầu vào khi tạo hồ sơ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub age: u32,
    pub blood_type: String,
    pub emergency_contact: String,
    /// `YYYY-MM-DD` hoặc RFC 3339.
    pub due_date: String,
    pub primary_care_provider_id: String,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub is_high_risk: bool,
}

/// Các trường được phép cập nhật trên hồ sơ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProfileUpdate {
    pub risk_level: Option<RiskLevel>,
    pub current_trimester: Option<Trimester>,
    pub is_high_risk: Option<bool>,
    pub emergency_contact: Option<String>,
    pub primary_care_provider_id: Option<String>,
    pub add_medical_history: Vec<String>,
    pub add_allergies: Vec<String>,
}

/// Dữ liệu đầu vào khi đăng ký nhân viên y tế.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProviderInput {
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    pub contact_info: String,
    pub facility_id: String,
    pub role: ProviderRole,
}

/// Dữ liệu đầu vào cho một lần đo. Trường bỏ trống không bị kiểm tra.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MetricsInput {
    pub maternal_profile_id: String,
    pub weight: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub blood_sugar: Option<f64>,
    pub hemoglobin_level: Option<f64>,
    pub fetal_heart_rate: Option<f64>,
    pub notes: String,
    pub recorded_by: String,
}

/// Dữ liệu đầu vào khi đặt lịch khám.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct VisitInput {
    pub maternal_profile_id: String,
    pub provider_id: String,
    pub scheduled_date: String,
    pub visit_type: String,
}

/// Kết quả ghi nhận khi hoàn tất buổi khám.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct VisitOutcome {
    pub findings: String,
    pub recommendations: String,
    pub prescriptions: Vec<String>,
    pub follow_up_required: bool,
    pub next_visit_date: Option<String>,
}

/// Loại bản ghi, dùng trong thông báo lỗi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Profile,
    Provider,
    Metrics,
    Visit,
    Alert,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Profile => "Maternal profile",
            RecordKind::Provider => "Healthcare provider",
            RecordKind::Metrics => "Health metrics",
            RecordKind::Visit => "Prenatal visit",
            RecordKind::Alert => "Health alert",
        })
    }
}

/// Lỗi chung của hệ thống hồ sơ.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CareError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("{0}")]
    Precondition(String),
    /// Chi tiết chỉ dùng để ghi log, không hiển thị ra ngoài.
    #[error("Internal error")]
    Internal(String),
}

impl CareError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        CareError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_type_parses_all_labels() {
        for blood_type in BloodType::ALL {
            assert_eq!(blood_type.as_str().parse::<BloodType>(), Ok(blood_type));
        }
        for label in ["C+", "ab-", " O+", "O"] {
            assert_eq!(
                label.parse::<BloodType>(),
                Err(CareError::Validation("Invalid blood type".to_string()))
            );
        }
    }

    #[test]
    fn trimester_boundaries_follow_thirteen_week_stages() {
        assert_eq!(Trimester::from_gestational_weeks(0), Trimester::First);
        assert_eq!(Trimester::from_gestational_weeks(13), Trimester::First);
        assert_eq!(Trimester::from_gestational_weeks(14), Trimester::Second);
        assert_eq!(Trimester::from_gestational_weeks(26), Trimester::Second);
        assert_eq!(Trimester::from_gestational_weeks(27), Trimester::Third);
        assert_eq!(Trimester::from_gestational_weeks(45), Trimester::Third);
    }

    #[test]
    fn trimester_from_due_date() {
        let week = NANOS_PER_WEEK as u64;
        let now = 1_000 * week;

        assert_eq!(Trimester::for_due_date(now + 30 * week, now), Trimester::First);
        assert_eq!(Trimester::for_due_date(now + 20 * week, now), Trimester::Second);
        assert_eq!(Trimester::for_due_date(now + 5 * week, now), Trimester::Third);
        assert_eq!(Trimester::for_due_date(now - week, now), Trimester::Third);
        // 26.5 weeks out is 13 completed weeks.
        assert_eq!(
            Trimester::for_due_date(now + 26 * week + week / 2, now),
            Trimester::First
        );
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = CareError::Internal("timestamp overflow at 42".to_string());
        assert_eq!(err.to_string(), "Internal error");

        let err = CareError::not_found(RecordKind::Provider, "p-1");
        assert_eq!(err.to_string(), "Healthcare provider p-1 not found");
    }
}
