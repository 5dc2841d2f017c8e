//! Intrinsic function expressions.
//!
//! These map one-to-one onto the template schema's function forms
//! (`Ref`, `Fn::Join`, `Fn::Sub`, ...). An expression is plain data;
//! the reference resolver renders it to its canonical JSON encoding and
//! recurses into its arguments, so relationships nested anywhere inside
//! an expression are still found.
//!
//! `Ref` here names a parameter or pseudo-parameter. A reference to
//! another *resource* is a [`crate::Relationship`], so the dependency
//! graph sees it.

use indexmap::IndexMap;

use crate::value::PropertyValue;

/// An intrinsic function expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `Ref` to a parameter or pseudo-parameter by name
    Ref(String),
    /// `Fn::GetAtt` with a literal target outside the stack's resources
    GetAtt {
        /// Target name
        target: String,
        /// Attribute name
        attribute: String,
    },
    /// `Fn::Base64`
    Base64(PropertyValue),
    /// `Fn::Cidr`
    Cidr {
        /// The address block to subdivide
        ip_block: PropertyValue,
        /// Number of CIDRs to generate
        count: PropertyValue,
        /// Subnet bits of each CIDR
        cidr_bits: PropertyValue,
    },
    /// `Fn::And` over condition values
    And(Vec<PropertyValue>),
    /// `Fn::Equals`
    Equals(PropertyValue, PropertyValue),
    /// `Fn::If`
    If {
        /// Condition name or nested condition
        condition: PropertyValue,
        /// Value if the condition holds
        if_true: PropertyValue,
        /// Value otherwise
        if_false: PropertyValue,
    },
    /// `Fn::Not`
    Not(PropertyValue),
    /// `Fn::Or` over condition values
    Or(Vec<PropertyValue>),
    /// `Fn::FindInMap`
    FindInMap {
        /// Name of the mapping block
        map_name: PropertyValue,
        /// Top-level key
        top_key: PropertyValue,
        /// Second-level key
        second_key: PropertyValue,
    },
    /// `Fn::GetAZs`
    GetAzs(PropertyValue),
    /// `Fn::ImportValue`
    ImportValue(PropertyValue),
    /// `Fn::Join`
    Join {
        /// Delimiter placed between parts
        delimiter: PropertyValue,
        /// Parts to join
        parts: Vec<PropertyValue>,
    },
    /// `Fn::Select`
    Select {
        /// Index into the options
        index: PropertyValue,
        /// List to select from
        options: PropertyValue,
    },
    /// `Fn::Split`
    Split {
        /// Delimiter to split on
        delimiter: PropertyValue,
        /// Source string
        source: PropertyValue,
    },
    /// `Fn::Sub` with named substitution variables
    Sub {
        /// Template string with `${...}` placeholders
        template: PropertyValue,
        /// Substitution variables
        variables: IndexMap<String, PropertyValue>,
    },
    /// `Fn::Transform`
    Transform {
        /// Macro name
        name: PropertyValue,
        /// Macro parameters
        parameters: IndexMap<String, PropertyValue>,
    },
}

impl Expr {
    /// All argument values nested in this expression.
    ///
    /// Used to scan expressions for embedded relationships; `Ref` and the
    /// literal `GetAtt` form carry only names and contribute nothing.
    #[must_use]
    pub fn arguments(&self) -> Vec<&PropertyValue> {
        match self {
            Self::Ref(_) | Self::GetAtt { .. } => Vec::new(),
            Self::Base64(v) | Self::Not(v) | Self::GetAzs(v) | Self::ImportValue(v) => {
                vec![v]
            }
            Self::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => vec![ip_block, count, cidr_bits],
            Self::And(vs) | Self::Or(vs) => vs.iter().collect(),
            Self::Equals(lhs, rhs) => vec![lhs, rhs],
            Self::If {
                condition,
                if_true,
                if_false,
            } => vec![condition, if_true, if_false],
            Self::FindInMap {
                map_name,
                top_key,
                second_key,
            } => vec![map_name, top_key, second_key],
            Self::Join { delimiter, parts } => {
                let mut args = vec![delimiter];
                args.extend(parts.iter());
                args
            }
            Self::Select { index, options } => vec![index, options],
            Self::Split { delimiter, source } => vec![delimiter, source],
            Self::Sub {
                template,
                variables,
            } => {
                let mut args = vec![template];
                args.extend(variables.values());
                args
            }
            Self::Transform { name, parameters } => {
                let mut args = vec![name];
                args.extend(parameters.values());
                args
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_has_no_arguments() {
        let expr = Expr::Ref("Namespace".to_string());
        assert!(expr.arguments().is_empty());
    }

    #[test]
    fn test_join_arguments_include_delimiter() {
        let expr = Expr::Join {
            delimiter: PropertyValue::from("/"),
            parts: vec![PropertyValue::from("a"), PropertyValue::from("b")],
        };
        assert_eq!(expr.arguments().len(), 3);
    }

    #[test]
    fn test_sub_arguments_include_variables() {
        let mut variables = IndexMap::new();
        variables.insert("Env".to_string(), PropertyValue::from("prod"));
        let expr = Expr::Sub {
            template: PropertyValue::from("${Env}-suffix"),
            variables,
        };
        assert_eq!(expr.arguments().len(), 2);
    }
}
