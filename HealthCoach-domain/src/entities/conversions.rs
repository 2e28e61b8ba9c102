use health_coach_data::models::blood_oxygen::{BloodOxygenRecord, NewBloodOxygenRecord};
use health_coach_data::models::heart_rate::{HeartRateRecord, NewHeartRateRecord};
use health_coach_data::models::series::ReadingSummary;
use health_coach_data::models::user::UserRecord;
use uuid::Uuid;

use crate::entities::blood_oxygen::BloodOxygenReading;
use crate::entities::heart_rate::{HeartRateReading, ValidatedSample};
use crate::entities::series::{ReadingStats, TimeRange};
use crate::entities::user::User;

// Conversion functions between domain entities and data models.
// Named convert_to_[target_layer]_[model_name].

/// Parse a string ID into a UUID
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert a stored user into the domain user, dropping the password hash
pub fn convert_to_domain_user(record: UserRecord) -> User {
    User {
        id: record.id,
        email: record.email,
        username: record.username,
        created_at: record.created_at,
    }
}

/// Convert a stored heart rate reading into a domain reading
pub fn convert_to_domain_reading(record: HeartRateRecord) -> HeartRateReading {
    HeartRateReading {
        id: record.id,
        value: record.value,
        sample_count: record.sample_count,
        recorded_at: record.recorded_at,
    }
}

/// Convert a validated sample into the data model used for appending history
pub fn convert_to_data_reading(sample: &ValidatedSample) -> NewHeartRateRecord {
    NewHeartRateRecord {
        value: sample.value,
        sample_count: sample.sample_count,
        recorded_at: sample.timestamp.clone(),
    }
}

/// Convert a stored blood oxygen reading into a domain reading
pub fn convert_to_domain_blood_oxygen(record: BloodOxygenRecord) -> BloodOxygenReading {
    BloodOxygenReading {
        id: record.id,
        value: record.value,
        recorded_at: record.recorded_at,
    }
}

pub fn convert_to_data_blood_oxygen(value: f64, recorded_at: String) -> NewBloodOxygenRecord {
    NewBloodOxygenRecord { value, recorded_at }
}

/// Convert repository aggregates into statistics, rounding the mean to one decimal
pub fn convert_to_domain_stats(summary: ReadingSummary, range: TimeRange) -> ReadingStats {
    ReadingStats {
        average: (summary.average * 10.0).round() / 10.0,
        min: summary.min,
        max: summary.max,
        current: summary.latest,
        reading_count: summary.count,
        range,
    }
}
