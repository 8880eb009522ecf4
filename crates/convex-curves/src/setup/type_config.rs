//! Per-curve type configuration.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use convex_core::types::{Date, IborIndex, OvernightIndex};
use convex_math::interpolation::InterpolatorSpec;

use crate::curves::CurveValueKind;
use crate::error::{CurveError, CurveResult};
use crate::functional_form::{functional_form, FunctionalForm};
use crate::generators::{CurveGenerator, FunctionalGenerator, InterpolatedGenerator, SpreadGenerator};
use crate::instruments::{time_between, NodeTimeCalculator};
use crate::issuer::{IssuerKey, IssuerMatcher, LegalEntityFilter, Matcher};
use crate::models::{CurveModel, Issuer};
use crate::provider::{CurveRoles, DiscountingId};

fn lookup_form(name: &str) -> CurveResult<Arc<dyn FunctionalForm>> {
    functional_form(name)
        .ok_or_else(|| CurveError::unsupported(format!("unknown functional form {name}")))
}

/// A curve built on another named curve.
#[derive(Debug, Clone, PartialEq)]
struct SpreadOver {
    base: String,
    subtract: bool,
}

/// Roles and shape of one curve.
///
/// Obtained from [`CurveSetup::using`](super::CurveSetup::using). Shape
/// options are exclusive: a curve is either interpolated (with an optional
/// value kind, fixed node dates and spread base) or a functional form.
/// Conflicting or repeated choices fail when they are made.
pub struct CurveTypeConfig<M> {
    name: String,
    roles: CurveRoles,
    interpolator: Option<InterpolatorSpec>,
    functional_form: Option<Arc<dyn FunctionalForm>>,
    kind: Option<CurveValueKind>,
    node_dates: Option<Vec<Date>>,
    spread: Option<SpreadOver>,
    node_time: Option<NodeTimeCalculator>,
    model: PhantomData<fn() -> M>,
}

impl<M> Clone for CurveTypeConfig<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            roles: self.roles.clone(),
            interpolator: self.interpolator,
            functional_form: self.functional_form.clone(),
            kind: self.kind,
            node_dates: self.node_dates.clone(),
            spread: self.spread.clone(),
            node_time: self.node_time,
            model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for CurveTypeConfig<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveTypeConfig")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .field("interpolator", &self.interpolator)
            .field("functional_form", &self.functional_form)
            .field("kind", &self.kind)
            .field("node_dates", &self.node_dates)
            .field("spread", &self.spread)
            .field("node_time", &self.node_time)
            .finish()
    }
}

impl<M: CurveModel> CurveTypeConfig<M> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: CurveRoles::default(),
            interpolator: None,
            functional_form: None,
            kind: None,
            node_dates: None,
            spread: None,
            node_time: None,
            model: PhantomData,
        }
    }

    fn conflict(&self, reason: impl fmt::Display) -> CurveError {
        CurveError::configuration(format!("curve {}: {reason}", self.name))
    }

    fn check_not_functional(&self, option: &str) -> CurveResult<()> {
        match &self.functional_form {
            Some(form) => Err(self.conflict(format!(
                "cannot set {option} on a {} functional form",
                form.name()
            ))),
            None => Ok(()),
        }
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Roles declared so far.
    #[must_use]
    pub fn roles(&self) -> &CurveRoles {
        &self.roles
    }

    /// Discounts cash flows for a currency or custom key.
    pub fn for_discounting(&mut self, id: impl Into<DiscountingId>) -> CurveResult<&mut Self> {
        let id = id.into();
        if let Some(existing) = &self.roles.discounting {
            return Err(self.conflict(format!("already discounts {existing}, cannot discount {id}")));
        }
        self.roles.discounting = Some(id);
        Ok(self)
    }

    /// Forecasts term indices.
    ///
    /// Models that project each index off its own forward curve accept one
    /// index per curve.
    pub fn for_index<I>(&mut self, indices: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = IborIndex>,
    {
        let mut all = self.roles.ibor_indices.clone();
        for index in indices {
            if !all.contains(&index) {
                all.push(index);
            }
        }
        if M::SINGLE_IBOR_INDEX && all.len() > 1 {
            return Err(self.conflict(format!(
                "the {} model allows one term index per curve, got {}",
                M::NAME,
                all.len()
            )));
        }
        self.roles.ibor_indices = all;
        Ok(self)
    }

    /// Forecasts overnight indices.
    pub fn for_overnight_index<I>(&mut self, indices: I) -> &mut Self
    where
        I: IntoIterator<Item = OvernightIndex>,
    {
        for index in indices {
            if !self.roles.overnight_indices.contains(&index) {
                self.roles.overnight_indices.push(index);
            }
        }
        self
    }

    /// Interpolates node values with `spec`.
    pub fn with_interpolator(&mut self, spec: InterpolatorSpec) -> CurveResult<&mut Self> {
        self.check_not_functional("an interpolator")?;
        if self.interpolator.is_some() {
            return Err(self.conflict("interpolator already set"));
        }
        self.interpolator = Some(spec);
        Ok(self)
    }

    /// Uses the registered functional form `name` instead of interpolation.
    ///
    /// The form is resolved now: registering another form under the same
    /// name later does not affect this curve. Fails with an
    /// unsupported-combination error for unknown names.
    pub fn functional_form(&mut self, name: &str) -> CurveResult<&mut Self> {
        if let Some(existing) = &self.functional_form {
            return Err(self.conflict(format!(
                "functional form {} already set",
                existing.name()
            )));
        }
        let taken = [
            (self.interpolator.is_some(), "an interpolator"),
            (self.kind.is_some(), "an interpolated value kind"),
            (self.node_dates.is_some(), "node dates"),
            (self.spread.is_some(), "a spread base"),
        ];
        if let Some((_, option)) = taken.iter().find(|(set, _)| *set) {
            return Err(self.conflict(format!(
                "cannot use a functional form with {option} already set"
            )));
        }
        self.functional_form = Some(lookup_form(name)?);
        Ok(self)
    }

    /// Builds the curve as `base + increment`.
    pub fn as_spread_over(&mut self, base: impl Into<String>) -> CurveResult<&mut Self> {
        self.set_spread(base.into(), false)
    }

    /// Builds the curve as `base - increment`.
    pub fn as_spread_over_subtracting(&mut self, base: impl Into<String>) -> CurveResult<&mut Self> {
        self.set_spread(base.into(), true)
    }

    fn set_spread(&mut self, base: String, subtract: bool) -> CurveResult<&mut Self> {
        self.check_not_functional("a spread base")?;
        if let Some(existing) = &self.spread {
            return Err(self.conflict(format!("already a spread over {}", existing.base)));
        }
        if base == self.name {
            return Err(self.conflict("cannot be a spread over itself"));
        }
        self.spread = Some(SpreadOver { base, subtract });
        Ok(self)
    }

    /// Places nodes on fixed dates instead of at instrument node times.
    pub fn using_node_dates<I>(&mut self, dates: I) -> CurveResult<&mut Self>
    where
        I: IntoIterator<Item = Date>,
    {
        self.check_not_functional("node dates")?;
        if self.node_dates.is_some() {
            return Err(self.conflict("node dates already set"));
        }
        if let Some(CurveValueKind::PeriodicYield { .. }) = self.kind {
            return Err(self.conflict("node dates cannot be used with periodic interpolation"));
        }
        let dates: Vec<Date> = dates.into_iter().collect();
        if dates.len() < 2 {
            return Err(self.conflict(format!(
                "at least 2 node dates are needed, got {}",
                dates.len()
            )));
        }
        self.node_dates = Some(dates);
        Ok(self)
    }

    fn set_kind(&mut self, kind: CurveValueKind) -> CurveResult<&mut Self> {
        self.check_not_functional("an interpolated value kind")?;
        if let Some(existing) = self.kind {
            return Err(self.conflict(format!("value kind already set to {existing:?}")));
        }
        self.kind = Some(kind);
        Ok(self)
    }

    /// Interpolates continuously-compounded zero rates (the default).
    pub fn continuous_interpolation_on_yield(&mut self) -> CurveResult<&mut Self> {
        self.set_kind(CurveValueKind::ContinuousYield)
    }

    /// Interpolates discount factors.
    pub fn continuous_interpolation_on_discount_factors(&mut self) -> CurveResult<&mut Self> {
        self.set_kind(CurveValueKind::DiscountFactor)
    }

    /// Interpolates rates compounded `periods_per_year` times a year.
    pub fn periodic_interpolation_on_yield(&mut self, periods_per_year: u32) -> CurveResult<&mut Self> {
        if periods_per_year == 0 {
            return Err(self.conflict("periodic compounding needs at least one period a year"));
        }
        if self.node_dates.is_some() {
            return Err(self.conflict("periodic interpolation cannot be used with node dates"));
        }
        self.set_kind(CurveValueKind::PeriodicYield { periods_per_year })
    }

    fn set_node_time(&mut self, node_time: NodeTimeCalculator) -> CurveResult<&mut Self> {
        if let Some(existing) = self.node_time {
            return Err(self.conflict(format!("node time already set to {existing:?}")));
        }
        self.node_time = Some(node_time);
        Ok(self)
    }

    /// Nodes at instrument maturities.
    pub fn using_instrument_maturity(&mut self) -> CurveResult<&mut Self> {
        self.set_node_time(NodeTimeCalculator::Maturity)
    }

    /// Nodes at the end of each instrument's last fixing period.
    pub fn using_last_fixing_end_time(&mut self) -> CurveResult<&mut Self> {
        self.set_node_time(NodeTimeCalculator::LastFixingEnd)
    }

    /// Nodes at the start of each instrument's last fixing period.
    pub fn using_last_fixing_start_time(&mut self) -> CurveResult<&mut Self> {
        self.set_node_time(NodeTimeCalculator::LastFixingStart)
    }

    /// Name of the spread base, if any.
    #[must_use]
    pub fn spread_base(&self) -> Option<&str> {
        self.spread.as_ref().map(|s| s.base.as_str())
    }

    /// The node-time convention in effect.
    #[must_use]
    pub fn node_time_calculator(&self) -> NodeTimeCalculator {
        self.node_time
            .unwrap_or_else(|| M::default_node_time(&self.roles))
    }

    /// Checks that the configuration describes a buildable curve.
    pub(crate) fn validate(&self) -> CurveResult<()> {
        if self.interpolator.is_none() && self.functional_form.is_none() {
            return Err(self.conflict("neither an interpolator nor a functional form is set"));
        }
        if let Some(DiscountingId::Custom(key)) = &self.roles.discounting {
            return Err(CurveError::unsupported(format!(
                "curve {}: discounting key {key} is not a currency",
                self.name
            )));
        }
        if M::SINGLE_IBOR_INDEX && self.roles.ibor_indices.len() > 1 {
            return Err(self.conflict(format!(
                "the {} model allows one term index per curve",
                M::NAME
            )));
        }
        Ok(())
    }

    /// Checks that `nodes` market nodes are enough for the interpolator.
    pub(crate) fn validate_node_count(&self, nodes: usize) -> CurveResult<()> {
        let Some(spec) = self.interpolator else {
            return Ok(());
        };
        let required = spec.method.min_points();
        let points = self.node_dates.as_ref().map_or(nodes, Vec::len);
        if points < required {
            return Err(self.conflict(format!(
                "{} interpolation needs at least {required} nodes, got {points}",
                spec.method
            )));
        }
        Ok(())
    }

    /// The generator for this curve at `valuation`.
    ///
    /// Node dates become times from the valuation date.
    pub fn build_curve_generator(&self, valuation: Date) -> CurveResult<Box<dyn CurveGenerator>> {
        self.validate()?;
        let generator: Box<dyn CurveGenerator> = match (&self.functional_form, self.interpolator) {
            (Some(form), _) => Box::new(FunctionalGenerator::new(Arc::clone(form))),
            (None, Some(spec)) => {
                let kind = self.kind.unwrap_or_default();
                match &self.node_dates {
                    Some(dates) => Box::new(InterpolatedGenerator::with_node_times(
                        kind,
                        spec,
                        dates.iter().map(|d| time_between(valuation, *d)).collect(),
                    )?),
                    None => Box::new(InterpolatedGenerator::new(
                        kind,
                        spec,
                        self.node_time_calculator(),
                    )),
                }
            }
            (None, None) => {
                return Err(self.conflict("neither an interpolator nor a functional form is set"))
            }
        };
        Ok(match &self.spread {
            Some(SpreadOver { base, subtract: false }) => {
                Box::new(SpreadGenerator::new(base.clone(), generator))
            }
            Some(SpreadOver { base, subtract: true }) => {
                Box::new(SpreadGenerator::subtracting(base.clone(), generator))
            }
            None => generator,
        })
    }
}

impl CurveTypeConfig<Issuer> {
    /// Discounts bonds of issuers whose `filter` key equals `key`.
    pub fn for_issuer(
        &mut self,
        key: IssuerKey,
        filter: Arc<dyn LegalEntityFilter>,
    ) -> CurveResult<&mut Self> {
        self.for_issuer_matcher(Arc::new(IssuerMatcher::new(key, filter)))
    }

    /// Discounts bonds of issuers accepted by `matcher`.
    pub fn for_issuer_matcher(&mut self, matcher: Arc<dyn Matcher>) -> CurveResult<&mut Self> {
        if let Some(existing) = self.roles.issuers.first() {
            return Err(self.conflict(format!(
                "already an issuer curve for {}",
                existing.key()
            )));
        }
        self.roles.issuers.push(matcher);
        Ok(self)
    }
}
