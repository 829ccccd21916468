//! # Validation Bridge
//!
//! The per-call orchestrator. One bridge is built per resource *type* and
//! shared by every attribute of every instance of that type.
//!
//! ## Per-Call States
//!
//! - **Deferred**: some configuration value is still unknown. Nothing is
//!   materialized and no diagnostics are produced. Re-evaluated on every
//!   call; never cached.
//! - **Evaluated**: the whole configuration is materialized, the backend
//!   validator runs once, and every returned error is tested for
//!   attribution to the requested attribute.
//!
//! ## Expression Table
//!
//! The table is built on first use behind a `OnceLock`: concurrent first
//! calls block until the single build finishes, and later reads take no
//! lock. The table never changes afterwards.
//!
//! ## Errors
//!
//! A configuration that cannot be materialized is returned as an error, not
//! as an empty diagnostic list: it means the schema and the domain model are
//! wired together incorrectly.

use std::sync::OnceLock;

use vbridge_core::{BridgeError, BridgeOptions, ConfigStore, Diagnostic, Diagnostics};
use vbridge_schema::{ExpressionSource, ExpressionTable, Schema};

use crate::materialize::Materializer;
use crate::plan::{plan_requests, ValidationRequest};
use crate::reconcile::{complete, reconcile};
use crate::store::StoreValidator;

/// Validation bridge over domain objects of type `D`.
pub struct ValidationBridge<D> {
    source: Box<dyn ExpressionSource>,
    materializer: Box<dyn Materializer<D>>,
    validator: Box<dyn StoreValidator<D>>,
    options: BridgeOptions,
    table: OnceLock<ExpressionTable>,
}

impl<D: 'static> ValidationBridge<D> {
    /// Create a bridge. The expression table is not built until the first
    /// validation call.
    pub fn new(
        source: impl ExpressionSource + 'static,
        materializer: impl Materializer<D> + 'static,
        validator: impl StoreValidator<D> + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            materializer: Box::new(materializer),
            validator: Box::new(validator),
            options: BridgeOptions::default(),
            table: OnceLock::new(),
        }
    }

    /// Replace the default options.
    pub fn with_options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// The expression table, building it on first access.
    pub fn expression_table(&self) -> &ExpressionTable {
        self.table.get_or_init(|| {
            let table = self.source.build_table();
            tracing::debug!(entries = table.len(), "expression table ready");
            table
        })
    }

    /// Returns true once the expression table has been built.
    pub fn is_table_built(&self) -> bool {
        self.table.get().is_some()
    }

    /// Validate one attribute against the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns the materializer's error if the configuration cannot be
    /// converted into the domain object.
    pub fn validate(
        &self,
        request: &ValidationRequest,
        config: &dyn ConfigStore,
    ) -> Result<Diagnostics, BridgeError> {
        let table = self.expression_table();
        let Some(errors) = self.run_backend(config)? else {
            tracing::debug!(path = %request.path, "configuration not fully known, validation deferred");
            return Ok(Diagnostics::new());
        };
        Ok(self.attribute_errors(request, table, &errors))
    }

    /// Plan and validate every attribute instance in `config`.
    ///
    /// The backend validator runs once for the whole batch; each planned
    /// request filters the same error list for itself.
    ///
    /// # Errors
    ///
    /// Returns the materializer's error if the configuration cannot be
    /// converted into the domain object.
    pub fn validate_all(
        &self,
        schema: &Schema,
        config: &dyn ConfigStore,
    ) -> Result<Diagnostics, BridgeError> {
        let table = self.expression_table();
        let Some(errors) = self.run_backend(config)? else {
            tracing::debug!("configuration not fully known, validation deferred");
            return Ok(Diagnostics::new());
        };

        let mut diagnostics = Diagnostics::new();
        for request in plan_requests(schema, config.root()) {
            diagnostics.append(self.attribute_errors(&request, table, &errors));
        }
        Ok(diagnostics)
    }

    /// Materialize and run the backend, or `None` when deferred.
    fn run_backend(&self, config: &dyn ConfigStore) -> Result<Option<Vec<String>>, BridgeError> {
        if !config.is_fully_known() {
            return Ok(None);
        }
        let object = self.materializer.materialize(config)?;
        let errors = self.validator.validate(&object);
        tracing::debug!(errors = errors.len(), "backend validation finished");
        Ok(Some(errors))
    }

    /// Keep the errors that belong to `request` and turn them into
    /// diagnostics.
    fn attribute_errors(
        &self,
        request: &ValidationRequest,
        table: &ExpressionTable,
        errors: &[String],
    ) -> Diagnostics {
        let dynamic = request.path.dynamic_steps();
        let completed = complete(&request.path_expr, &dynamic);
        let value = request.value.to_string();

        let mut diagnostics = Diagnostics::new();
        for error in errors {
            match reconcile(error, &request.path_expr, &completed, table, &dynamic) {
                Some(detail) => {
                    tracing::debug!(path = %request.path, %detail, "attributed backend error");
                    diagnostics.push(Diagnostic::new(
                        request.path.clone(),
                        self.options.severity,
                        self.options.summary.clone(),
                        detail,
                        value.clone(),
                    ));
                }
                None => tracing::trace!(path = %request.path, %error, "backend error not attributed"),
            }
        }
        diagnostics
    }
}
