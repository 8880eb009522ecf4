//! The set of curves (and model data) instruments are priced against.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use convex_core::types::{Currency, IborIndex, LegalEntity, OvernightIndex};

use crate::calculators::HullWhiteParameters;
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::fx::FxMatrix;
use crate::issuer::Matcher;

/// Key under which a curve discounts cash flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscountingId {
    /// Discounts flows in this currency.
    Currency(Currency),
    /// Any other key. Not supported by the calibration engine.
    Custom(String),
}

impl From<Currency> for DiscountingId {
    fn from(currency: Currency) -> Self {
        Self::Currency(currency)
    }
}

impl fmt::Display for DiscountingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency(c) => write!(f, "{c}"),
            Self::Custom(key) => write!(f, "{key}"),
        }
    }
}

/// What a curve is used for once it is in a provider.
#[derive(Debug, Clone, Default)]
pub struct CurveRoles {
    /// Discounting key.
    pub discounting: Option<DiscountingId>,
    /// Term indices projected off the curve.
    pub ibor_indices: Vec<IborIndex>,
    /// Overnight indices projected off the curve.
    pub overnight_indices: Vec<OvernightIndex>,
    /// Issuers whose bonds are discounted on the curve.
    pub issuers: Vec<Arc<dyn Matcher>>,
}

impl CurveRoles {
    /// A discounting curve for `currency`.
    #[must_use]
    pub fn discounting(currency: Currency) -> Self {
        Self {
            discounting: Some(currency.into()),
            ..Self::default()
        }
    }

    /// True if no role is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discounting.is_none()
            && self.ibor_indices.is_empty()
            && self.overnight_indices.is_empty()
            && self.issuers.is_empty()
    }
}

/// How term-index forwards are read off an index curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IborCurveKind {
    /// The index curve is a pseudo-discount curve; forwards come from the
    /// ratio of discount factors over the index period.
    #[default]
    DiscountFactor,
    /// The index curve holds forward rates directly: its rate at a fixing
    /// period's start time is that period's forward.
    DirectForward,
}

/// Curves by name, the roles that route instruments to them, and the model
/// data some calculators need.
#[derive(Debug, Clone, Default)]
pub struct ParameterProvider {
    curves: BTreeMap<String, Arc<dyn Curve>>,
    discounting: BTreeMap<Currency, String>,
    ibor: HashMap<IborIndex, String>,
    overnight: HashMap<OvernightIndex, String>,
    issuers: Vec<(Arc<dyn Matcher>, String)>,
    fx: FxMatrix,
    hull_white: Option<(HullWhiteParameters, Currency)>,
    ibor_curve_kind: IborCurveKind,
}

impl ParameterProvider {
    /// An empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a curve under its own name and registers its roles.
    pub fn add_curve(&mut self, curve: Arc<dyn Curve>, roles: &CurveRoles) -> CurveResult<()> {
        let name = curve.name().to_string();
        self.register_roles(&name, roles)?;
        self.curves.insert(name, curve);
        Ok(())
    }

    /// Builder-style [`add_curve`](Self::add_curve).
    pub fn with_curve(mut self, curve: Arc<dyn Curve>, roles: &CurveRoles) -> CurveResult<Self> {
        self.add_curve(curve, roles)?;
        Ok(self)
    }

    /// Adds or replaces a curve without touching the roles.
    pub fn insert_curve(&mut self, curve: Arc<dyn Curve>) {
        self.curves.insert(curve.name().to_string(), curve);
    }

    /// Routes the roles in `roles` to the curve called `name`.
    pub fn register_roles(&mut self, name: &str, roles: &CurveRoles) -> CurveResult<()> {
        match &roles.discounting {
            Some(DiscountingId::Currency(currency)) => {
                self.discounting.insert(*currency, name.to_string());
            }
            Some(DiscountingId::Custom(key)) => {
                return Err(CurveError::unsupported(format!(
                    "discounting key '{key}' on curve {name}: only currencies are supported"
                )));
            }
            None => {}
        }
        for index in &roles.ibor_indices {
            self.ibor.insert(index.clone(), name.to_string());
        }
        for index in &roles.overnight_indices {
            self.overnight.insert(index.clone(), name.to_string());
        }
        for matcher in &roles.issuers {
            match self
                .issuers
                .iter_mut()
                .find(|(m, _)| m.same_registration(matcher.as_ref()))
            {
                Some((_, existing)) if existing.as_str() != name => {
                    return Err(CurveError::configuration(format!(
                        "issuer key {} with filter {} is already routed to curve {existing}, \
                         cannot route it to {name}",
                        matcher.key(),
                        matcher.filter_identity()
                    )));
                }
                Some(entry) => entry.0 = Arc::clone(matcher),
                None => self.issuers.push((Arc::clone(matcher), name.to_string())),
            }
        }
        Ok(())
    }

    /// The curve called `name`.
    pub fn curve(&self, name: &str) -> CurveResult<&Arc<dyn Curve>> {
        self.curves
            .get(name)
            .ok_or_else(|| CurveError::curve_not_found(name))
    }

    /// True if a curve called `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Curve names in sorted order.
    pub fn curve_names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True if there are no curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// The curve discounting flows in `currency`.
    pub fn discounting_curve(&self, currency: Currency) -> CurveResult<&Arc<dyn Curve>> {
        let name = self
            .discounting
            .get(&currency)
            .ok_or_else(|| CurveError::curve_not_found(format!("discounting curve for {currency}")))?;
        self.curve(name)
    }

    /// The curve projecting `index`.
    pub fn ibor_curve(&self, index: &IborIndex) -> CurveResult<&Arc<dyn Curve>> {
        let name = self
            .ibor
            .get(index)
            .ok_or_else(|| CurveError::curve_not_found(format!("forward curve for {index}")))?;
        self.curve(name)
    }

    /// The curve projecting `index`.
    pub fn overnight_curve(&self, index: &OvernightIndex) -> CurveResult<&Arc<dyn Curve>> {
        let name = self
            .overnight
            .get(index)
            .ok_or_else(|| CurveError::curve_not_found(format!("forward curve for {index}")))?;
        self.curve(name)
    }

    /// The first issuer curve whose matcher accepts `entity`.
    pub fn issuer_curve(&self, entity: &LegalEntity) -> CurveResult<&Arc<dyn Curve>> {
        let name = self
            .issuers
            .iter()
            .find(|(matcher, _)| matcher.matches(entity))
            .map(|(_, name)| name)
            .ok_or_else(|| {
                CurveError::curve_not_found(format!("issuer curve for {}", entity.short_name))
            })?;
        self.curve(name)
    }

    /// Spot FX rates.
    #[must_use]
    pub fn fx_matrix(&self) -> &FxMatrix {
        &self.fx
    }

    /// Merges `fx` into the provider's FX rates.
    pub fn add_fx_matrix(&mut self, fx: &FxMatrix) {
        self.fx.merge(fx);
    }

    /// Hull-White parameters and the currency they apply to.
    #[must_use]
    pub fn hull_white(&self) -> Option<(&HullWhiteParameters, Currency)> {
        self.hull_white.as_ref().map(|(p, c)| (p, *c))
    }

    /// Sets the Hull-White parameters for `currency`.
    pub fn set_hull_white(&mut self, parameters: HullWhiteParameters, currency: Currency) {
        self.hull_white = Some((parameters, currency));
    }

    /// How term-index forwards are read off index curves.
    #[must_use]
    pub fn ibor_curve_kind(&self) -> IborCurveKind {
        self.ibor_curve_kind
    }

    /// Sets how term-index forwards are read off index curves.
    pub fn set_ibor_curve_kind(&mut self, kind: IborCurveKind) {
        self.ibor_curve_kind = kind;
    }

    /// Copies every curve, role and FX rate of `other` into this provider.
    ///
    /// Entries of `other` win on conflict. Model data is taken from `other`
    /// only when it has some.
    pub fn merge(&mut self, other: &ParameterProvider) {
        for (name, curve) in &other.curves {
            self.curves.insert(name.clone(), Arc::clone(curve));
        }
        self.discounting
            .extend(other.discounting.iter().map(|(c, n)| (*c, n.clone())));
        self.ibor
            .extend(other.ibor.iter().map(|(i, n)| (i.clone(), n.clone())));
        self.overnight
            .extend(other.overnight.iter().map(|(i, n)| (i.clone(), n.clone())));
        for (matcher, name) in &other.issuers {
            self.issuers
                .retain(|(m, _)| !m.same_registration(matcher.as_ref()));
            self.issuers.push((Arc::clone(matcher), name.clone()));
        }
        self.fx.merge(&other.fx);
        if other.hull_white.is_some() {
            self.hull_white.clone_from(&other.hull_white);
        }
    }
}
