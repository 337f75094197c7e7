use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::MethodHandle;
use crate::error::{DuplicateMethodError, Result, RpcError};
use crate::method::{DynMethod, Method};

/// The closed set of methods a server exposes under fixed names.
///
/// Built once, read-only afterwards. Clones share the same registry, so an
/// `Api` can be handed to any number of transports and concurrent calls.
#[derive(Clone, Default)]
pub struct Api {
    methods: Arc<BTreeMap<String, Arc<dyn DynMethod>>>,
}

impl Api {
    /// Start building an API from typed methods.
    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynMethod>> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Input and output schema documents of one method.
    pub fn describe(&self, name: &str) -> Option<MethodDescription> {
        self.methods
            .get_key_value(name)
            .map(|(name, method)| MethodDescription::new(name, method.as_ref()))
    }

    /// Descriptions of every method, sorted by name.
    pub fn descriptions(&self) -> Vec<MethodDescription> {
        self.methods
            .iter()
            .map(|(name, method)| MethodDescription::new(name, method.as_ref()))
            .collect()
    }

    /// Look up `name` once and invoke it on raw JSON input.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value> {
        let method = self
            .get(name)
            .cloned()
            .ok_or_else(|| RpcError::MethodNotFound(name.to_string()))?;
        method.invoke_value(input).await
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Build an API from `(name, method)` pairs.
///
/// Later pairs replace earlier ones with the same name.
pub fn define_api<N, M>(methods: M) -> Api
where
    N: Into<String>,
    M: IntoIterator<Item = (N, Arc<dyn DynMethod>)>,
{
    Api {
        methods: Arc::new(
            methods
                .into_iter()
                .map(|(name, method)| (name.into(), method))
                .collect(),
        ),
    }
}

/// Incrementally registers typed methods and hands back typed handles.
#[derive(Default)]
pub struct ApiBuilder {
    methods: BTreeMap<String, Arc<dyn DynMethod>>,
    duplicates: Vec<String>,
}

impl ApiBuilder {
    /// Register a typed method and return a handle that calls it by name.
    pub fn register<I, O>(&mut self, name: impl Into<String>, method: Method<I, O>) -> MethodHandle<I, O>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        let name = name.into();
        let handle = MethodHandle::new(name.as_str());
        self.register_dyn(name, method.erase());
        handle
    }

    /// Register an already type-erased method.
    pub fn register_dyn(&mut self, name: impl Into<String>, method: Arc<dyn DynMethod>) {
        let name = name.into();
        if self.methods.insert(name.clone(), method).is_some() {
            self.duplicates.push(name);
        }
    }

    /// Finish the registry, rejecting names registered more than once.
    pub fn build(self) -> std::result::Result<Api, DuplicateMethodError> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(DuplicateMethodError(name));
        }
        Ok(Api {
            methods: Arc::new(self.methods),
        })
    }
}

/// Name and schema documents of a registered method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescription {
    pub name: String,
    pub input: Value,
    pub output: Value,
}

impl MethodDescription {
    fn new(name: &str, method: &dyn DynMethod) -> Self {
        Self {
            name: name.to_string(),
            input: method.input_schema().clone(),
            output: method.output_schema().clone(),
        }
    }
}
