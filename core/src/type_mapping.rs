#![deny(missing_docs)]

//! # Type Mapping
//!
//! Normalizes Rust type expressions into documentation data-type names.
//! Scalars become lower-case semantic names, user types keep their simple name,
//! and wrappers such as `Option`, `Box` or references are transparent.

use crate::error::{AppError, AppResult};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasGenericArgs};
use ra_ap_syntax::{AstNode, SourceFile};
use std::fmt::Display;

/// Represents a normalized documentation data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// A string type.
    String,
    /// An integer type.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean type.
    Boolean,
    /// No value (unit or missing return type).
    Void,
    /// A collection of items.
    Array(Box<DataType>),
    /// A named model type (e.g. `Pet`), case preserved.
    Model(String),
}

impl DataType {
    /// Whether the type is a collection of items.
    pub fn is_collection(&self) -> bool {
        matches!(self, DataType::Array(_))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Integer => write!(f, "integer"),
            DataType::Number => write!(f, "number"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Void => write!(f, "void"),
            DataType::Array(inner) => write!(f, "Array[{}]", inner),
            DataType::Model(name) => write!(f, "{}", name),
        }
    }
}

/// Trait for converting Rust type strings to documentation data types.
pub trait TypeMapper {
    /// Maps a Rust type string (e.g., `Option<i32>`) to a data type.
    fn map(&self, rust_type: &str) -> AppResult<DataType>;
}

/// The standard implementation of `TypeMapper`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeMapper;

impl TypeMapper for RustTypeMapper {
    fn map(&self, rust_type: &str) -> AppResult<DataType> {
        if rust_type.trim().is_empty() {
            return Err(AppError::General("Empty type string".into()));
        }

        // Wrap in a type alias so the parser sees a complete item
        let code = format!("type _Wrapper = {};", rust_type);
        let parse = SourceFile::parse(&code, Edition::Edition2021);
        if !parse.errors().is_empty() {
            return Err(AppError::General(format!(
                "Failed to parse type string: {}",
                rust_type
            )));
        }
        let file = parse.tree();

        let type_alias = file
            .syntax()
            .descendants()
            .find_map(ast::TypeAlias::cast)
            .ok_or_else(|| {
                AppError::General(format!("Failed to parse type string: {}", rust_type))
            })?;

        let root_type = type_alias
            .ty()
            .ok_or_else(|| AppError::General(format!("Invalid type syntax: {}", rust_type)))?;

        map_ast_type(&root_type)
    }
}

/// Recursively maps an AST Type node to a DataType.
fn map_ast_type(ty: &ast::Type) -> AppResult<DataType> {
    match ty {
        ast::Type::PathType(path_type) => {
            let path = path_type
                .path()
                .ok_or_else(|| AppError::General("Empty path".into()))?;
            // `segment()` is the last segment, so `models::Pet` resolves to `Pet`
            let segment = path
                .segment()
                .ok_or_else(|| AppError::General("Empty segment".into()))?;
            let name_ref = segment
                .name_ref()
                .ok_or_else(|| AppError::General("No type name".into()))?;
            let name = name_ref.text();

            match name.as_str() {
                "String" | "str" | "char" | "Uuid" | "Url" | "DateTime" | "NaiveDateTime"
                | "NaiveDate" | "NaiveTime" => Ok(DataType::String),
                "bool" => Ok(DataType::Boolean),
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize" => Ok(DataType::Integer),
                "f32" | "f64" => Ok(DataType::Number),

                // Transparent wrappers
                "Option" | "Box" | "Rc" | "Arc" | "Cow" => first_generic_arg(&segment),

                // Collections
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" => {
                    Ok(DataType::Array(Box::new(first_generic_arg(&segment)?)))
                }

                other => Ok(DataType::Model(other.to_string())),
            }
        }
        ast::Type::RefType(ref_type) => {
            let inner = ref_type
                .ty()
                .ok_or_else(|| AppError::General("Invalid reference".into()))?;
            map_ast_type(&inner)
        }
        ast::Type::PtrType(ptr_type) => {
            let inner = ptr_type
                .ty()
                .ok_or_else(|| AppError::General("Invalid pointer".into()))?;
            map_ast_type(&inner)
        }
        ast::Type::ParenType(paren) => {
            let inner = paren
                .ty()
                .ok_or_else(|| AppError::General("Invalid parenthesized type".into()))?;
            map_ast_type(&inner)
        }
        ast::Type::SliceType(slice) => {
            let inner = slice
                .ty()
                .ok_or_else(|| AppError::General("Invalid slice".into()))?;
            Ok(DataType::Array(Box::new(map_ast_type(&inner)?)))
        }
        ast::Type::ArrayType(array) => {
            let inner = array
                .ty()
                .ok_or_else(|| AppError::General("Invalid array".into()))?;
            Ok(DataType::Array(Box::new(map_ast_type(&inner)?)))
        }
        ast::Type::TupleType(tuple) => {
            if tuple.fields().next().is_none() {
                Ok(DataType::Void)
            } else {
                Ok(DataType::Model("object".to_string()))
            }
        }
        ast::Type::NeverType(_) => Ok(DataType::Void),
        // `impl Responder` and friends carry no concrete model
        ast::Type::ImplTraitType(_) | ast::Type::DynTraitType(_) => {
            Ok(DataType::Model("object".to_string()))
        }
        _ => Err(AppError::General(format!(
            "Unsupported type structure: {}",
            ty.syntax().text()
        ))),
    }
}

/// Maps the first generic argument of a segment such as `Option<T>` or `Vec<T>`.
fn first_generic_arg(segment: &ast::PathSegment) -> AppResult<DataType> {
    let generic_args = segment
        .generic_arg_list()
        .ok_or_else(|| AppError::General("Missing generic arguments for container type".into()))?;

    let first_arg = generic_args
        .generic_args()
        .find(|arg| matches!(arg, ast::GenericArg::TypeArg(_)))
        .ok_or_else(|| AppError::General("Generic list empty".into()))?;

    match first_arg {
        ast::GenericArg::TypeArg(type_arg) => {
            let inner_ty = type_arg
                .ty()
                .ok_or_else(|| AppError::General("Invalid generic type".into()))?;
            map_ast_type(&inner_ty)
        }
        _ => Err(AppError::General(
            "Unsupported generic argument type".into(),
        )),
    }
}

/// Returns the simple name of a type path: generics stripped, last `::` segment kept.
///
/// `crate::errors::NotFound<T>` becomes `NotFound`.
pub fn simple_type_name(rust_type: &str) -> String {
    let trimmed = rust_type.trim().trim_start_matches('&').trim();
    let without_generics = trimmed.split('<').next().unwrap_or(trimmed);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim()
        .to_string()
}
