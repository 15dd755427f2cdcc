use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Reference data for a selling country: currency, display locale and the
/// freight/acquisition defaults seeded into a fresh line-item set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub code: String,
    pub name: String,
    pub currency_code: String,
    pub symbol: String,
    pub locale: String,
    pub default_freight: Decimal,
    pub default_cpa_base: Decimal,
}

impl CountryProfile {
    pub fn new(
        code: &str,
        name: &str,
        currency_code: &str,
        symbol: &str,
        locale: &str,
        default_freight: Decimal,
        default_cpa_base: Decimal,
    ) -> Self {
        Self {
            code: code.to_ascii_uppercase(),
            name: name.to_string(),
            currency_code: currency_code.to_ascii_uppercase(),
            symbol: symbol.to_string(),
            locale: locale.to_string(),
            default_freight,
            default_cpa_base,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountryCatalog {
    profiles: Vec<CountryProfile>,
}

impl Default for CountryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CountryCatalog {
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                CountryProfile::new(
                    "CO",
                    "Colombia",
                    "COP",
                    "$",
                    "es-CO",
                    Decimal::from(20_000),
                    Decimal::from(15_000),
                ),
                CountryProfile::new(
                    "CL",
                    "Chile",
                    "CLP",
                    "$",
                    "es-CL",
                    Decimal::from(4_500),
                    Decimal::from(5_000),
                ),
                CountryProfile::new(
                    "MX",
                    "México",
                    "MXN",
                    "$",
                    "es-MX",
                    Decimal::from(120),
                    Decimal::from(90),
                ),
                CountryProfile::new(
                    "PE",
                    "Perú",
                    "PEN",
                    "S/",
                    "es-PE",
                    Decimal::from(15),
                    Decimal::from(12),
                ),
                CountryProfile::new(
                    "EC",
                    "Ecuador",
                    "USD",
                    "$",
                    "es-EC",
                    Decimal::new(550, 2),
                    Decimal::new(400, 2),
                ),
                CountryProfile::new(
                    "AR",
                    "Argentina",
                    "ARS",
                    "$",
                    "es-AR",
                    Decimal::from(6_000),
                    Decimal::from(4_500),
                ),
                CountryProfile::new(
                    "GT",
                    "Guatemala",
                    "GTQ",
                    "Q",
                    "es-GT",
                    Decimal::from(35),
                    Decimal::from(30),
                ),
            ],
        }
    }

    pub fn get(&self, code: &str) -> Option<&CountryProfile> {
        let code = code.trim();
        self.profiles.iter().find(|profile| profile.code.eq_ignore_ascii_case(code))
    }

    pub fn require(&self, code: &str) -> Result<&CountryProfile, DomainError> {
        self.get(code).ok_or_else(|| DomainError::UnknownCountry(code.trim().to_string()))
    }

    /// Replaces the profile with the same code, or appends a new one.
    pub fn upsert(&mut self, profile: CountryProfile) {
        match self.profiles.iter_mut().find(|existing| existing.code == profile.code) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn profiles(&self) -> &[CountryProfile] {
        &self.profiles
    }

    pub fn codes(&self) -> Vec<&str> {
        self.profiles.iter().map(|profile| profile.code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::errors::DomainError;

    use super::{CountryCatalog, CountryProfile};

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = CountryCatalog::builtin();

        let colombia = catalog.get("co").expect("colombia should be in the builtin catalog");
        assert_eq!(colombia.currency_code, "COP");
        assert_eq!(colombia.default_freight, Decimal::from(20_000));
        assert_eq!(colombia.default_cpa_base, Decimal::from(15_000));
    }

    #[test]
    fn require_reports_unknown_country() {
        let catalog = CountryCatalog::builtin();

        assert_eq!(catalog.require(" zz "), Err(DomainError::UnknownCountry("zz".to_string())));
    }

    #[test]
    fn upsert_overrides_existing_profile_in_place() {
        let mut catalog = CountryCatalog::builtin();
        let before = catalog.codes().len();

        catalog.upsert(CountryProfile::new(
            "cl",
            "Chile",
            "CLP",
            "$",
            "es-CL",
            Decimal::from(3_990),
            Decimal::from(7_000),
        ));

        assert_eq!(catalog.codes().len(), before);
        assert_eq!(catalog.codes()[1], "CL");
        assert_eq!(catalog.get("CL").map(|p| p.default_freight), Some(Decimal::from(3_990)));
    }

    #[test]
    fn upsert_appends_new_country() {
        let mut catalog = CountryCatalog::builtin();

        catalog.upsert(CountryProfile::new(
            "BO",
            "Bolivia",
            "BOB",
            "Bs",
            "es-BO",
            Decimal::from(25),
            Decimal::from(20),
        ));

        assert_eq!(catalog.codes().last().copied(), Some("BO"));
    }
}
