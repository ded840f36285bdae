//! Business documents
//!
//! Typed models for the documents the back office authors in the content
//! platform. Each document exposes `validate()` returning the field rules the
//! authoring studio enforces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use uuid::Uuid;

use super::identifiers::Reference;
use super::null_as_default;
use crate::error::CoreError;
use crate::forms::is_valid_email;

/// How strongly a field rule objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks publishing
    #[default]
    Error,
    /// Shown to the author but does not block publishing
    Warning,
}

/// A failed field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path, e.g. `metals[0].weight`
    pub field: String,
    /// Message shown to the author
    pub message: String,
    /// Error or warning
    #[serde(default)]
    pub severity: Severity,
}

impl FieldError {
    /// A blocking rule failure
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// A non-blocking rule failure
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(field, message)
        }
    }

    /// Whether the failure blocks publishing
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub(crate) fn require_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    message: &str,
) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.push(FieldError::new(field, message));
    }
}

fn require_number(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<f64>,
    required: Option<&str>,
    negative: &str,
) {
    match value {
        None => {
            if let Some(message) = required {
                errors.push(FieldError::new(field, message));
            }
        }
        Some(v) if v < 0.0 => errors.push(FieldError::new(field, negative)),
        Some(_) => {}
    }
}

fn require_reference(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&Reference>,
    message: &str,
) {
    if value.and_then(Reference::target).is_none() {
        errors.push(FieldError::new(field, message));
    }
}

/// Generate a job id: `job_<unix millis>_<9 lowercase alphanumerics>`
pub fn generate_job_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("job_{}_{}", millis, suffix)
}

/// Lifecycle of a pickup job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// Default for new jobs
    #[default]
    InProgress,
    /// Metals collected and paid for
    Completed,
    /// Abandoned
    Cancelled,
}

impl JobStatus {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(CoreError::ValidationError(format!(
                "Unknown job status: {}",
                other
            ))),
        }
    }
}

/// One metal collected in a job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalEntry {
    /// Array item key
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Reference to a `metals` document
    #[serde(default)]
    pub metal: Option<Reference>,
    /// Weight in pounds
    #[serde(default)]
    pub weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub purchase_price: Option<f64>,
    /// Free text
    #[serde(default)]
    pub notes: Option<String>,
}

/// A pickup job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Job title
    #[serde(default)]
    pub name: Option<String>,
    /// Human-facing job id
    #[serde(default)]
    pub job_id: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Metals collected
    #[serde(default, deserialize_with = "null_as_default")]
    pub metals: Vec<MetalEntry>,
    /// Sum of entry weights
    #[serde(default)]
    pub total_weight: Option<f64>,
    /// Sum of entry purchase prices
    #[serde(default)]
    pub total_purchase_price: Option<f64>,
    /// Status
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: JobStatus,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_completed: Option<String>,
    /// Customers the job was done for
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer: Vec<Reference>,
    /// Related blog posts
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_blog_posts: Vec<Reference>,
    /// Processing steps
    #[serde(default, deserialize_with = "null_as_default")]
    pub processes: Vec<Reference>,
}

impl Job {
    /// New in-progress job with a generated job id and today's date
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            job_id: Some(generate_job_id()),
            date_created: Some(Utc::now().format("%Y-%m-%d").to_string()),
            ..Default::default()
        }
    }

    /// Recompute the read-only totals from the metal entries
    pub fn recompute_totals(&mut self) {
        let weight = self.metals.iter().filter_map(|m| m.weight).sum();
        let price = self.metals.iter().filter_map(|m| m.purchase_price).sum();
        self.total_weight = Some(weight);
        self.total_purchase_price = Some(price);
    }

    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "A job title is required");
        require_text(&mut errors, "jobId", self.job_id.as_deref(), "Job ID is required");

        for (i, entry) in self.metals.iter().enumerate() {
            require_reference(
                &mut errors,
                &format!("metals[{}].metal", i),
                entry.metal.as_ref(),
                "Metal type is required",
            );
            require_number(
                &mut errors,
                &format!("metals[{}].weight", i),
                entry.weight,
                Some("Weight is required"),
                "Weight must be a positive number",
            );
            require_number(
                &mut errors,
                &format!("metals[{}].purchasePrice", i),
                entry.purchase_price,
                Some("Purchase price is required"),
                "Purchase price must be a positive number",
            );
        }

        require_number(
            &mut errors,
            "totalWeight",
            self.total_weight,
            None,
            "Total weight must be a positive number",
        );
        require_number(
            &mut errors,
            "totalPurchasePrice",
            self.total_purchase_price,
            None,
            "Total income must be a positive number",
        );
        errors
    }
}

/// Postal address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street
    #[serde(default)]
    pub street: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Province or state
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// A customer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Address
    #[serde(default)]
    pub address: Option<Address>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
}

impl Customer {
    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "Customer name is required");

        match self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            None => errors.push(FieldError::new("email", "Email address is required")),
            Some(email) if !is_valid_email(email) => {
                errors.push(FieldError::new("email", "Please enter a valid email address"))
            }
            Some(_) => {}
        }

        require_text(&mut errors, "phone", self.phone.as_deref(), "Phone number is required");

        if let Some(address) = &self.address {
            require_text(
                &mut errors,
                "address.street",
                address.street.as_deref(),
                "Street address is required",
            );
            require_text(&mut errors, "address.city", address.city.as_deref(), "City is required");
            require_text(&mut errors, "address.state", address.state.as_deref(), "State is required");
            require_text(
                &mut errors,
                "address.zipCode",
                address.zip_code.as_deref(),
                "ZIP code is required",
            );
        }

        require_text(
            &mut errors,
            "dateCreated",
            self.date_created.as_deref(),
            "Date created is required",
        );
        errors
    }
}

/// Metal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetalType {
    /// Iron based
    Ferrous,
    /// Copper, aluminium, brass...
    NonFerrous,
    /// Gold, silver, palladium...
    Precious,
}

impl MetalType {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            MetalType::Ferrous => "ferrous",
            MetalType::NonFerrous => "non-ferrous",
            MetalType::Precious => "precious",
        }
    }
}

/// Unit a metal is priced in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetalUnit {
    /// Pounds
    #[default]
    Lbs,
    /// Kilograms
    Kg,
    /// Tons
    Tons,
}

/// Whether a metal is currently bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetalStatus {
    /// Bought
    #[default]
    Active,
    /// Not bought
    Inactive,
}

/// A metal in the price catalogue
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metal {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Classification
    #[serde(rename = "type", default)]
    pub kind: Option<MetalType>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Price per pound
    #[serde(default)]
    pub current_price_per_pound: Option<f64>,
    /// Unit
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: MetalUnit,
    /// Stored under `isActive` with `active`/`inactive` values
    #[serde(rename = "isActive", default, deserialize_with = "null_as_default")]
    pub status: MetalStatus,
}

impl Metal {
    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "A metal name is required");
        if self.kind.is_none() {
            errors.push(FieldError::new("type", "A metal type is required"));
        }
        require_number(
            &mut errors,
            "currentPricePerPound",
            self.current_price_per_pound,
            Some("Current price per pound is required"),
            "Price must be a positive number",
        );
        errors
    }
}

/// Kind of consumable material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    /// Acids, reagents
    Chemical,
    /// Mechanical parts
    Mechanical,
    /// Electronic parts
    Electronic,
    /// Used up in processing
    Consumable,
    /// Hand tools
    Tool,
    /// Machines
    Equipment,
}

/// Units materials are measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialUnit {
    /// Pounds
    #[serde(rename = "lbs")]
    Lbs,
    /// Kilograms
    #[serde(rename = "kg")]
    Kg,
    /// Grams
    #[serde(rename = "g")]
    Grams,
    /// Ounces
    #[serde(rename = "oz")]
    Ounces,
    /// Liters
    #[serde(rename = "L")]
    Liters,
    /// Milliliters
    #[serde(rename = "mL")]
    Milliliters,
    /// Gallons
    #[serde(rename = "gal")]
    Gallons,
    /// Cubic feet
    #[serde(rename = "ft3")]
    CubicFeet,
    /// Cubic meters
    #[serde(rename = "m3")]
    CubicMeters,
    /// Pieces
    #[serde(rename = "pieces")]
    Pieces,
    /// Units
    #[serde(rename = "units")]
    Units,
}

/// A material used while processing metals
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Kind
    #[serde(rename = "type", default)]
    pub kind: Option<MaterialType>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit the material is measured in
    #[serde(default)]
    pub base_unit: Option<MaterialUnit>,
    /// Supplier
    #[serde(default)]
    pub supplier: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_acquired: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub expiration_date: Option<String>,
}

impl Material {
    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "Material name is required");
        if self.kind.is_none() {
            errors.push(FieldError::new("type", "Material type is required"));
        }
        if self.base_unit.is_none() {
            errors.push(FieldError::new("baseUnit", "Base unit is required"));
        }
        errors
    }
}

/// A work session on a process
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    /// RFC 3339 timestamp
    #[serde(default)]
    pub start_time: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub end_time: Option<String>,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeRecord {
    /// Duration rounded to whole minutes, when both ends parse
    pub fn minutes(&self) -> Option<i64> {
        let start = parse_timestamp(self.start_time.as_deref()?)?;
        let end = parse_timestamp(self.end_time.as_deref()?)?;
        let millis = (end - start).num_milliseconds() as f64;
        Some((millis / 60_000.0).round() as i64)
    }

    /// Field rules
    pub fn validate(&self, prefix: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(
            &mut errors,
            &format!("{}.startTime", prefix),
            self.start_time.as_deref(),
            "Start time is required",
        );
        require_text(
            &mut errors,
            &format!("{}.endTime", prefix),
            self.end_time.as_deref(),
            "End time is required",
        );
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > 100)
        {
            errors.push(FieldError::warning(
                format!("{}.description", prefix),
                "Description should be brief",
            ));
        }
        errors
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Quantity of a material
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    /// Amount
    #[serde(default)]
    pub amount: Option<f64>,
    /// Unit
    #[serde(default)]
    pub unit: Option<MaterialUnit>,
}

/// Cost of a material usage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDetails {
    /// Cost per unit
    #[serde(default)]
    pub unit_cost: Option<f64>,
    /// Stored total, formatted to two decimals
    #[serde(default)]
    pub total_cost: Option<String>,
    /// Always `CAD`
    #[serde(default)]
    pub currency: Option<String>,
}

impl CostDetails {
    /// Total cost for an amount, `"0.00"` unless amount and unit cost are both positive
    pub fn computed_total(&self, amount: Option<f64>) -> String {
        match (amount, self.unit_cost) {
            (Some(amount), Some(unit_cost)) if amount > 0.0 && unit_cost > 0.0 => {
                format!("{:.2}", amount * unit_cost)
            }
            _ => "0.00".to_string(),
        }
    }
}

fn validate_usage_fields(
    errors: &mut Vec<FieldError>,
    prefix: &str,
    material: Option<&Reference>,
    quantity: Option<&Quantity>,
    cost: Option<&CostDetails>,
    date_used: Option<&str>,
) {
    let path = |field: &str| {
        if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        }
    };

    require_reference(errors, &path("material"), material, "Material reference is required");
    require_number(
        errors,
        &path("quantityUsed.amount"),
        quantity.and_then(|q| q.amount),
        Some("Amount is required"),
        "Amount must be a positive number",
    );
    if quantity.and_then(|q| q.unit).is_none() {
        errors.push(FieldError::new(path("quantityUsed.unit"), "Unit is required"));
    }
    require_number(
        errors,
        &path("costDetails.unitCost"),
        cost.and_then(|c| c.unit_cost),
        Some("Unit cost is required"),
        "Unit cost must be a positive number",
    );
    require_text(
        errors,
        &path("costDetails.currency"),
        cost.and_then(|c| c.currency.as_deref()),
        "Currency is required",
    );
    require_text(errors, &path("dateUsed"), date_used, "Date used is required");
}

/// Material usage embedded in a process
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMaterialUsage {
    /// Material
    #[serde(default)]
    pub material: Option<Reference>,
    /// Quantity
    #[serde(default)]
    pub quantity_used: Option<Quantity>,
    /// Cost
    #[serde(default)]
    pub cost_details: Option<CostDetails>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_used: Option<String>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A processing run over collected metals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Weight going in
    #[serde(default)]
    pub starting_weight: Option<f64>,
    /// Weight coming out
    #[serde(default)]
    pub yield_weight: Option<f64>,
    /// Work sessions
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_records: Vec<TimeRecord>,
    /// Metals processed
    #[serde(default, deserialize_with = "null_as_default")]
    pub metals: Vec<Reference>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_completed: Option<String>,
    /// Materials consumed
    #[serde(default, deserialize_with = "null_as_default")]
    pub material_usages: Vec<ProcessMaterialUsage>,
}

impl Process {
    /// Total logged time in minutes, summing each record rounded to the minute
    pub fn total_minutes(&self) -> i64 {
        self.time_records.iter().filter_map(TimeRecord::minutes).sum()
    }

    /// Yield weight over starting weight, when both are known and the start is positive
    pub fn yield_ratio(&self) -> Option<f64> {
        match (self.starting_weight, self.yield_weight) {
            (Some(start), Some(out)) if start > 0.0 => Some(out / start),
            _ => None,
        }
    }

    /// Whether a completion date is set
    pub fn is_completed(&self) -> bool {
        self.date_completed.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "Process name is required");
        require_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            "Process description is required",
        );
        require_number(
            &mut errors,
            "startingWeight",
            self.starting_weight,
            Some("Starting weight is required"),
            "Starting weight must be a positive number",
        );
        require_number(
            &mut errors,
            "yieldWeight",
            self.yield_weight,
            None,
            "Yield weight must be a positive number",
        );
        for (i, record) in self.time_records.iter().enumerate() {
            errors.extend(record.validate(&format!("timeRecords[{}]", i)));
        }
        if self.metals.is_empty() {
            errors.push(FieldError::new("metals", "At least one metal is required"));
        }
        require_text(
            &mut errors,
            "dateCreated",
            self.date_created.as_deref(),
            "Date created is required",
        );
        for (i, usage) in self.material_usages.iter().enumerate() {
            validate_usage_fields(
                &mut errors,
                &format!("materialUsages[{}]", i),
                usage.material.as_ref(),
                usage.quantity_used.as_ref(),
                usage.cost_details.as_ref(),
                usage.date_used.as_deref(),
            );
        }
        errors
    }
}

/// A standalone material usage record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Material
    #[serde(default)]
    pub material: Option<Reference>,
    /// Process the material was used in
    #[serde(default)]
    pub process: Option<Reference>,
    /// Quantity
    #[serde(default)]
    pub quantity_used: Option<Quantity>,
    /// Cost
    #[serde(default)]
    pub cost_details: Option<CostDetails>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_used: Option<String>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl MaterialUsage {
    /// Total cost derived from quantity and unit cost
    pub fn total_cost(&self) -> String {
        let amount = self.quantity_used.as_ref().and_then(|q| q.amount);
        self.cost_details
            .clone()
            .unwrap_or_default()
            .computed_total(amount)
    }

    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_usage_fields(
            &mut errors,
            "",
            self.material.as_ref(),
            self.quantity_used.as_ref(),
            self.cost_details.as_ref(),
            self.date_used.as_deref(),
        );
        require_reference(
            &mut errors,
            "process",
            self.process.as_ref(),
            "Process reference is required",
        );
        errors
    }
}

/// One refining step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefiningStep {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Weight in grams
    #[serde(default)]
    pub weight_in_grams: Option<f64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl RefiningStep {
    /// Field rules
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "title", self.title.as_deref(), "Title is required");
        require_number(
            &mut errors,
            "weightInGrams",
            self.weight_in_grams,
            Some("Weight is required"),
            "Weight must be a positive number",
        );
        require_text(&mut errors, "date", self.date.as_deref(), "Date is required");
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn messages(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_generate_job_id_shape() {
        let id = generate_job_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "job");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_job_id(), generate_job_id());
    }

    #[test]
    fn test_job_status_wire_values() {
        let job: Job = serde_json::from_value(json!({"_id": "j1", "status": "completed"})).unwrap();
        assert_eq!(job.status, JobStatus::Completed);

        let job: Job = serde_json::from_value(json!({"_id": "j2", "status": null})).unwrap();
        assert_eq!(job.status, JobStatus::InProgress);

        assert_eq!("cancelled".parse::<JobStatus>().unwrap(), JobStatus::Cancelled);
        assert!("done".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_rules_and_totals() {
        let mut job = Job::new("j1", "Office clear-out");
        job.metals = vec![
            MetalEntry {
                metal: Some(Reference::to("copper")),
                weight: Some(12.5),
                purchase_price: Some(40.0),
                ..Default::default()
            },
            MetalEntry {
                metal: None,
                weight: Some(-1.0),
                purchase_price: None,
                ..Default::default()
            },
        ];

        assert_eq!(
            messages(&job.validate()),
            vec![
                "Metal type is required",
                "Weight must be a positive number",
                "Purchase price is required",
            ]
        );

        job.metals.pop();
        job.recompute_totals();
        assert_eq!(job.total_weight, Some(12.5));
        assert_eq!(job.total_purchase_price, Some(40.0));
        assert!(job.validate().is_empty());
    }

    #[test]
    fn test_customer_rules() {
        let customer = Customer {
            id: "c1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("not-an-email".to_string()),
            phone: Some("555-0100".to_string()),
            address: Some(Address {
                street: Some("1 Main St".to_string()),
                city: None,
                state: Some("ON".to_string()),
                zip_code: Some("K1A 0B1".to_string()),
            }),
            date_created: Some("2024-03-01".to_string()),
            ..Default::default()
        };

        assert_eq!(
            messages(&customer.validate()),
            vec!["Please enter a valid email address", "City is required"]
        );
    }

    #[test]
    fn test_metal_deserializes_status_field() {
        let metal: Metal = serde_json::from_value(json!({
            "_id": "m1",
            "name": "Copper #1",
            "type": "non-ferrous",
            "currentPricePerPound": 3.85,
            "isActive": "inactive"
        }))
        .unwrap();

        assert_eq!(metal.kind, Some(MetalType::NonFerrous));
        assert_eq!(metal.status, MetalStatus::Inactive);
        assert_eq!(metal.unit, MetalUnit::Lbs);
        assert!(metal.validate().is_empty());
    }

    #[test]
    fn test_cost_details_total() {
        let cost = CostDetails {
            unit_cost: Some(2.5),
            ..Default::default()
        };
        assert_eq!(cost.computed_total(Some(3.0)), "7.50");
        assert_eq!(cost.computed_total(Some(0.0)), "0.00");
        assert_eq!(cost.computed_total(None), "0.00");
        assert_eq!(CostDetails::default().computed_total(Some(4.0)), "0.00");
    }

    #[test]
    fn test_process_time_and_rules() {
        let process = Process {
            id: "p1".to_string(),
            name: Some("Board stripping".to_string()),
            description: Some("Strip gold fingers".to_string()),
            starting_weight: Some(10.0),
            yield_weight: Some(2.5),
            time_records: vec![
                TimeRecord {
                    start_time: Some("2024-05-01T09:00:00Z".to_string()),
                    end_time: Some("2024-05-01T09:29:40Z".to_string()),
                    ..Default::default()
                },
                TimeRecord {
                    start_time: Some("2024-05-01T13:00:00Z".to_string()),
                    end_time: Some("2024-05-01T14:00:00Z".to_string()),
                    description: Some("x".repeat(120)),
                    ..Default::default()
                },
                TimeRecord {
                    start_time: Some("2024-05-02T08:00:00Z".to_string()),
                    end_time: None,
                    ..Default::default()
                },
            ],
            metals: vec![],
            date_created: Some("2024-05-01".to_string()),
            ..Default::default()
        };

        assert_eq!(process.total_minutes(), 90);
        assert_eq!(process.yield_ratio(), Some(0.25));
        assert!(!process.is_completed());

        let errors = process.validate();
        assert_eq!(
            messages(&errors),
            vec![
                "Description should be brief",
                "End time is required",
                "At least one metal is required",
            ]
        );
        assert!(!errors[0].is_blocking());
        assert_eq!(errors[1].field, "timeRecords[2].endTime");
    }

    #[test]
    fn test_material_usage_rules() {
        let usage: MaterialUsage = serde_json::from_value(json!({
            "_id": "u1",
            "material": {"_ref": "nitric", "_type": "reference"},
            "quantityUsed": {"amount": 2, "unit": "L"},
            "costDetails": {"unitCost": 12.125, "currency": "CAD"},
            "dateUsed": "2024-05-01"
        }))
        .unwrap();

        assert_eq!(usage.total_cost(), "24.25");
        assert_eq!(messages(&usage.validate()), vec!["Process reference is required"]);
    }

    #[test]
    fn test_material_and_refining_step_rules() {
        let material = Material {
            id: "m1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            messages(&material.validate()),
            vec![
                "Material name is required",
                "Material type is required",
                "Base unit is required",
            ]
        );

        let step = RefiningStep {
            id: "r1".to_string(),
            title: Some("Melt".to_string()),
            weight_in_grams: Some(-3.0),
            date: Some("2024-05-01".to_string()),
            notes: None,
        };
        assert_eq!(messages(&step.validate()), vec!["Weight must be a positive number"]);
    }
}
