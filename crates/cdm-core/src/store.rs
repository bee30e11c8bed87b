//! Store: local favorites, donation records and profile.
//!
//! Everything lives in one JSON document. Each mutating call commits the
//! whole document before returning (write to a sibling temp file, then
//! rename), so a crash never leaves a half-written store behind. An in-memory
//! store skips the commit step and is used by tests and `--ephemeral` runs.

use crate::{error::StoreError, types::Place};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Payment method recorded when none is chosen.
pub const DEFAULT_PAYMENT_METHOD: &str = "Card (Dummy)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritePlace {
    pub place_id: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: u64,
    pub charity_name: String,
    /// Amount in minor units (cents).
    pub amount_cents: u64,
    pub payment_method: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Records {
    #[serde(default)]
    favorites: Vec<FavoritePlace>,
    #[serde(default)]
    donations: Vec<DonationRecord>,
    #[serde(default)]
    profile: Profile,
    #[serde(default)]
    next_donation_id: u64,
}

pub struct RecordStore {
    path: Option<PathBuf>,
    records: Records,
}

impl RecordStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is created on the first commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Records::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), favorites = records.favorites.len(), donations = records.donations.len(), "record store opened");
        Ok(Self { path: Some(path), records })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self { path: None, records: Records::default() }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // -- Favorites ----------------------------------------------------------

    /// Add `place` to favorites, or remove it if it is already there.
    /// Returns true when the place is a favorite afterwards.
    pub fn toggle_favorite(&mut self, place: &Place) -> Result<bool, StoreError> {
        let now_favorite = if let Some(pos) = self.favorite_position(&place.id) {
            self.records.favorites.remove(pos);
            false
        } else {
            self.records.favorites.push(FavoritePlace {
                place_id: place.id.clone(),
                name: place.name.clone(),
                subtitle: place.subtitle.clone(),
                latitude: place.coordinate.latitude,
                longitude: place.coordinate.longitude,
                created_at: Utc::now(),
            });
            true
        };
        self.commit()?;
        debug!(place_id = %place.id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Remove a favorite by id. Returns false if it was not a favorite.
    pub fn remove_favorite(&mut self, place_id: &str) -> Result<bool, StoreError> {
        match self.favorite_position(place_id) {
            Some(pos) => {
                self.records.favorites.remove(pos);
                self.commit()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_favorite(&self, place_id: &str) -> bool {
        self.favorite_position(place_id).is_some()
    }

    /// Favorites, newest first. A non-empty `filter` keeps entries whose name
    /// or subtitle contains it, ignoring case.
    pub fn favorites(&self, filter: &str) -> Vec<&FavoritePlace> {
        let needle = filter.trim().to_lowercase();
        self.records
            .favorites
            .iter()
            .rev()
            .filter(|f| {
                needle.is_empty()
                    || f.name.to_lowercase().contains(&needle)
                    || f.subtitle.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
            })
            .collect()
    }

    fn favorite_position(&self, place_id: &str) -> Option<usize> {
        self.records.favorites.iter().position(|f| f.place_id == place_id)
    }

    // -- Donations ----------------------------------------------------------

    /// Record a donation. `amount` is user text such as `"25"` or `"12.50"`.
    pub fn record_donation(
        &mut self,
        charity_name: &str,
        amount: &str,
        payment_method: Option<&str>,
    ) -> Result<DonationRecord, StoreError> {
        let charity_name = charity_name.trim();
        if charity_name.is_empty() {
            return Err(StoreError::MissingCharity);
        }
        let amount_cents = parse_amount_cents(amount)?;

        self.records.next_donation_id += 1;
        let record = DonationRecord {
            id: self.records.next_donation_id,
            charity_name: charity_name.to_string(),
            amount_cents,
            payment_method: payment_method.unwrap_or(DEFAULT_PAYMENT_METHOD).to_string(),
            date: Utc::now(),
        };
        self.records.donations.push(record.clone());
        self.commit()?;
        debug!(charity_name, amount_cents, "donation recorded");
        Ok(record)
    }

    /// Donations, newest first. A non-empty `filter` keeps entries whose
    /// charity name, payment method or formatted amount contains it, ignoring
    /// case.
    pub fn donations(&self, filter: &str) -> Vec<&DonationRecord> {
        let needle = filter.trim().to_lowercase();
        self.records
            .donations
            .iter()
            .rev()
            .filter(|d| {
                needle.is_empty()
                    || d.charity_name.to_lowercase().contains(&needle)
                    || d.payment_method.to_lowercase().contains(&needle)
                    || format_cents(d.amount_cents).contains(&needle)
            })
            .collect()
    }

    /// Sum of all recorded donations in cents.
    pub fn total_donated_cents(&self) -> u64 {
        self.records.donations.iter().map(|d| d.amount_cents).sum()
    }

    // -- Profile ------------------------------------------------------------

    pub fn profile(&self) -> &Profile {
        &self.records.profile
    }

    pub fn update_profile(&mut self, name: &str, email: &str) -> Result<(), StoreError> {
        self.records.profile = Profile {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
        };
        self.commit()
    }

    /// Delete every record.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.records = Records::default();
        self.commit()
    }

    fn commit(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        // Each commit gets its own temp file so concurrent writers never
        // share one; the rename is atomic on the same filesystem.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(&self.records)?)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Parse a positive amount with at most two fractional digits into cents.
pub fn parse_amount_cents(text: &str) -> Result<u64, StoreError> {
    let invalid = || StoreError::InvalidAmount(text.to_string());
    let trimmed = text.trim();

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || frac.len() > 2 || !all_digits(whole) || !all_digits(frac) {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let frac: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or_else(invalid)?;
    if cents == 0 {
        return Err(invalid());
    }
    Ok(cents)
}

/// Render cents as `"12.50"`.
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
