//! Function catalog: which calls exist, how many arguments they take and of
//! what type.
//!
//! The grammar accepts any `name(args)`; a schema-aware backend checks calls
//! against a [`FunctionCatalog`] instead. [`FunctionCatalog::odata`] holds the
//! OData v4 canonical functions.

use crate::schema::ValueType;
use std::collections::HashMap;
use std::fmt;

/// What an argument position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    /// Date, datetime or time
    Temporal,
    Datetime,
    Duration,
    Any,
}

impl ParamType {
    /// `Any` and `Null` arguments are accepted everywhere.
    pub fn accepts(self, actual: &ValueType) -> bool {
        if matches!(actual, ValueType::Any | ValueType::Null) {
            return true;
        }
        match self {
            ParamType::String => matches!(actual, ValueType::String),
            ParamType::Number => actual.is_numeric(),
            ParamType::Temporal => actual.is_temporal(),
            ParamType::Datetime => matches!(actual, ValueType::Datetime),
            ParamType::Duration => matches!(actual, ValueType::Duration),
            ParamType::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Temporal => "date, datetime or time",
            ParamType::Datetime => "datetime",
            ParamType::Duration => "duration",
            ParamType::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub min_args: usize,
    pub max_args: usize,
    /// One entry per argument position up to `max_args`.
    pub params: Vec<ParamType>,
    pub returns: ValueType,
    /// Known but not translated yet.
    pub supported: bool,
}

impl FunctionSignature {
    /// Signature taking exactly `params.len()` arguments.
    pub fn new(name: impl Into<String>, params: Vec<ParamType>, returns: ValueType) -> Self {
        let arity = params.len();
        FunctionSignature {
            name: name.into(),
            min_args: arity,
            max_args: arity,
            params,
            returns,
            supported: true,
        }
    }

    /// Lowers the minimum arity; trailing parameters become optional.
    pub fn with_min_args(mut self, min_args: usize) -> Self {
        self.min_args = min_args;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn param(&self, index: usize) -> ParamType {
        self.params.get(index).copied().unwrap_or(ParamType::Any)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    functions: HashMap<String, FunctionSignature>,
}

impl FunctionCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register(&mut self, signature: FunctionSignature) -> &mut Self {
        self.functions.insert(signature.name.clone(), signature);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// OData v4 canonical functions.
    pub fn odata() -> Self {
        use ParamType::*;

        let mut catalog = Self::empty();

        // String functions
        for name in ["contains", "endswith", "startswith"] {
            catalog.register(FunctionSignature::new(
                name,
                vec![String, String],
                ValueType::Boolean,
            ));
        }
        catalog.register(FunctionSignature::new("length", vec![String], ValueType::Number));
        catalog.register(FunctionSignature::new(
            "indexof",
            vec![String, String],
            ValueType::Number,
        ));
        catalog.register(
            FunctionSignature::new("substring", vec![String, Number, Number], ValueType::String)
                .with_min_args(2),
        );
        for name in ["tolower", "toupper", "trim"] {
            catalog.register(FunctionSignature::new(name, vec![String], ValueType::String));
        }
        catalog.register(FunctionSignature::new("concat", vec![String, String], ValueType::String));
        catalog.register(
            FunctionSignature::new("matchespattern", vec![String, String], ValueType::Boolean)
                .unsupported(),
        );

        // Date and time functions
        for name in ["year", "month", "day", "hour", "minute", "second", "fractionalseconds"] {
            catalog.register(FunctionSignature::new(name, vec![Temporal], ValueType::Number));
        }
        catalog.register(FunctionSignature::new("date", vec![Datetime], ValueType::Date));
        catalog.register(FunctionSignature::new("time", vec![Datetime], ValueType::Time));
        catalog.register(FunctionSignature::new(
            "totaloffsetminutes",
            vec![Datetime],
            ValueType::Number,
        ));
        catalog.register(FunctionSignature::new("totalseconds", vec![Duration], ValueType::Number));
        for name in ["now", "maxdatetime", "mindatetime"] {
            catalog.register(FunctionSignature::new(name, vec![], ValueType::Datetime));
        }

        // Arithmetic functions
        for name in ["round", "floor", "ceiling"] {
            catalog.register(FunctionSignature::new(name, vec![Number], ValueType::Number));
        }

        // Type and geo functions
        for name in ["cast", "isof"] {
            catalog.register(
                FunctionSignature::new(name, vec![Any, Any], ValueType::Any)
                    .with_min_args(1)
                    .unsupported(),
            );
        }
        for (name, arity, returns) in [
            ("geo.distance", 2, ValueType::Number),
            ("geo.length", 1, ValueType::Number),
            ("geo.intersects", 2, ValueType::Boolean),
        ] {
            catalog.register(FunctionSignature::new(name, vec![Any; arity], returns).unsupported());
        }

        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odata_catalog() {
        let catalog = FunctionCatalog::odata();
        let startswith = catalog.get("startswith").unwrap();
        assert_eq!((startswith.min_args, startswith.max_args), (2, 2));
        assert!(startswith.supported);

        let substring = catalog.get("substring").unwrap();
        assert_eq!((substring.min_args, substring.max_args), (2, 3));
        assert_eq!(substring.param(2), ParamType::Number);
        assert_eq!(substring.param(7), ParamType::Any);

        assert!(!catalog.get("matchespattern").unwrap().supported);
        assert!(catalog.get("foo").is_none());
    }

    #[test]
    fn test_param_accepts() {
        assert!(ParamType::Temporal.accepts(&ValueType::Date));
        assert!(ParamType::Temporal.accepts(&ValueType::Any));
        assert!(!ParamType::String.accepts(&ValueType::Number));
        assert!(ParamType::Number.accepts(&ValueType::Null));
    }
}
