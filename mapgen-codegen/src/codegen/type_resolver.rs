//! SQL column types to JDBC type names and Java types

use crate::dom::java::FullyQualifiedJavaType;
use crate::parser::ColumnMetadata;

/// JDBC type as written in `jdbcType="..."` attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JdbcType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Numeric,
    Char,
    VarChar,
    LongVarChar,
    Clob,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Date,
    Time,
    Timestamp,
    Other,
}

impl JdbcType {
    /// Name used by MyBatis for this type
    pub fn name(&self) -> &'static str {
        match self {
            JdbcType::Bit => "BIT",
            JdbcType::Boolean => "BOOLEAN",
            JdbcType::TinyInt => "TINYINT",
            JdbcType::SmallInt => "SMALLINT",
            JdbcType::Integer => "INTEGER",
            JdbcType::BigInt => "BIGINT",
            JdbcType::Real => "REAL",
            JdbcType::Double => "DOUBLE",
            JdbcType::Decimal => "DECIMAL",
            JdbcType::Numeric => "NUMERIC",
            JdbcType::Char => "CHAR",
            JdbcType::VarChar => "VARCHAR",
            JdbcType::LongVarChar => "LONGVARCHAR",
            JdbcType::Clob => "CLOB",
            JdbcType::Binary => "BINARY",
            JdbcType::VarBinary => "VARBINARY",
            JdbcType::LongVarBinary => "LONGVARBINARY",
            JdbcType::Blob => "BLOB",
            JdbcType::Date => "DATE",
            JdbcType::Time => "TIME",
            JdbcType::Timestamp => "TIMESTAMP",
            JdbcType::Other => "OTHER",
        }
    }
}

/// Resolved types for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub jdbc_type: JdbcType,
    pub java_type: FullyQualifiedJavaType,
}

/// Resolve SQL data types to JDBC and Java types
pub struct TypeResolver {
    java_time_types: bool,
}

impl TypeResolver {
    pub fn new(java_time_types: bool) -> Self {
        Self { java_time_types }
    }

    /// Get the JDBC and Java types for a column
    pub fn resolve(&self, column: &ColumnMetadata) -> ResolvedType {
        let jdbc_type = Self::resolve_jdbc_type(column);
        let java_type = self.resolve_java_type(column, jdbc_type);
        ResolvedType {
            jdbc_type,
            java_type,
        }
    }

    /// Map the declared SQL type onto a JDBC type
    fn resolve_jdbc_type(column: &ColumnMetadata) -> JdbcType {
        if column.is_enum() {
            return JdbcType::VarChar;
        }

        let base = column.base_type();
        let (precision, _) = column.precision_and_scale();

        match base.as_str() {
            "BOOL" | "BOOLEAN" => JdbcType::Boolean,
            // TINYINT(1) is typically used as boolean in MySQL
            "TINYINT" if precision == Some(1) => JdbcType::Bit,
            "BIT" if precision.unwrap_or(1) == 1 => JdbcType::Bit,
            "BIT" => JdbcType::Binary,
            "TINYINT" => JdbcType::TinyInt,
            "SMALLINT" | "INT2" | "SMALLSERIAL" => JdbcType::SmallInt,
            "MEDIUMINT" | "INT" | "INTEGER" | "INT4" | "SERIAL" => JdbcType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" => JdbcType::BigInt,
            "FLOAT" | "REAL" | "FLOAT4" => JdbcType::Real,
            "DOUBLE" | "FLOAT8" => JdbcType::Double,
            "DECIMAL" | "DEC" => JdbcType::Decimal,
            "NUMERIC" => JdbcType::Numeric,
            "CHAR" | "CHARACTER" | "NCHAR" => JdbcType::Char,
            "VARCHAR" | "NVARCHAR" | "SET" | "UUID" => JdbcType::VarChar,
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "JSON" | "JSONB" => JdbcType::LongVarChar,
            "LONGTEXT" | "CLOB" => JdbcType::Clob,
            "BINARY" => JdbcType::Binary,
            "VARBINARY" => JdbcType::VarBinary,
            "TINYBLOB" | "MEDIUMBLOB" | "BYTEA" => JdbcType::LongVarBinary,
            "BLOB" | "LONGBLOB" => JdbcType::Blob,
            "DATE" => JdbcType::Date,
            "TIME" => JdbcType::Time,
            "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" => JdbcType::Timestamp,
            _ => JdbcType::Other,
        }
    }

    /// Java type for a JDBC type. Wrapper types are used throughout so every
    /// property can hold SQL NULL.
    fn resolve_java_type(&self, column: &ColumnMetadata, jdbc_type: JdbcType) -> FullyQualifiedJavaType {
        let name = match jdbc_type {
            JdbcType::Bit | JdbcType::Boolean => "java.lang.Boolean",
            JdbcType::TinyInt if column.is_unsigned => "java.lang.Short",
            JdbcType::TinyInt => "java.lang.Byte",
            JdbcType::SmallInt if column.is_unsigned => "java.lang.Integer",
            JdbcType::SmallInt => "java.lang.Short",
            JdbcType::Integer if column.is_unsigned => "java.lang.Long",
            JdbcType::Integer => "java.lang.Integer",
            JdbcType::BigInt if column.is_unsigned => "java.math.BigInteger",
            JdbcType::BigInt => "java.lang.Long",
            JdbcType::Real => "java.lang.Float",
            JdbcType::Double => "java.lang.Double",
            JdbcType::Decimal | JdbcType::Numeric => Self::decimal_type(column),
            JdbcType::Char | JdbcType::VarChar | JdbcType::LongVarChar | JdbcType::Clob => {
                "java.lang.String"
            }
            JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob => {
                "byte[]"
            }
            JdbcType::Date if self.java_time_types => "java.time.LocalDate",
            JdbcType::Time if self.java_time_types => "java.time.LocalTime",
            JdbcType::Timestamp if self.java_time_types => "java.time.LocalDateTime",
            JdbcType::Date | JdbcType::Time | JdbcType::Timestamp => "java.util.Date",
            JdbcType::Other => "java.lang.Object",
        };
        FullyQualifiedJavaType::new(name)
    }

    /// Exact numerics fit the narrowest integral wrapper when they have no
    /// scale; anything with a scale or more than 18 digits is `BigDecimal`.
    fn decimal_type(column: &ColumnMetadata) -> &'static str {
        let (precision, scale) = column.precision_and_scale();
        // DECIMAL without arguments defaults to DECIMAL(10,0) in MySQL
        let precision = precision.unwrap_or(10);
        if scale.unwrap_or(0) > 0 || precision > 18 {
            "java.math.BigDecimal"
        } else if precision > 9 {
            "java.lang.Long"
        } else if precision > 4 {
            "java.lang.Integer"
        } else {
            "java.lang.Short"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_column(name: &str, data_type: &str, nullable: bool, unsigned: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default_value: None,
            is_auto_increment: false,
            is_unsigned: unsigned,
            enum_values: None,
            comment: None,
        }
    }

    fn java(resolver: &TypeResolver, data_type: &str) -> String {
        resolver
            .resolve(&make_column("c", data_type, true, false))
            .java_type
            .full_name()
    }

    #[test]
    fn test_integer_types() {
        let resolver = TypeResolver::new(true);
        let col = make_column("id", "BIGINT", false, false);
        let resolved = resolver.resolve(&col);
        assert_eq!(resolved.jdbc_type, JdbcType::BigInt);
        assert_eq!(resolved.java_type.full_name(), "java.lang.Long");

        let col = make_column("id", "BIGINT UNSIGNED", false, true);
        assert_eq!(
            resolver.resolve(&col).java_type.full_name(),
            "java.math.BigInteger"
        );

        assert_eq!(java(&resolver, "INT"), "java.lang.Integer");
        assert_eq!(java(&resolver, "SMALLINT"), "java.lang.Short");
        assert_eq!(java(&resolver, "TINYINT"), "java.lang.Byte");
    }

    #[test]
    fn test_boolean_type() {
        let resolver = TypeResolver::new(true);
        let col = make_column("active", "TINYINT(1)", false, false);
        let resolved = resolver.resolve(&col);
        assert_eq!(resolved.jdbc_type, JdbcType::Bit);
        assert_eq!(resolved.java_type.full_name(), "java.lang.Boolean");

        assert_eq!(java(&resolver, "BOOLEAN"), "java.lang.Boolean");
    }

    #[test]
    fn test_decimal_types() {
        let resolver = TypeResolver::new(true);
        assert_eq!(java(&resolver, "DECIMAL(10,2)"), "java.math.BigDecimal");
        assert_eq!(java(&resolver, "DECIMAL(20,0)"), "java.math.BigDecimal");
        assert_eq!(java(&resolver, "DECIMAL(12,0)"), "java.lang.Long");
        assert_eq!(java(&resolver, "NUMERIC(6)"), "java.lang.Integer");
        assert_eq!(java(&resolver, "DECIMAL(3,0)"), "java.lang.Short");
        assert_eq!(java(&resolver, "DECIMAL"), "java.lang.Long");
    }

    #[test]
    fn test_string_and_binary_types() {
        let resolver = TypeResolver::new(true);
        let col = make_column("name", "VARCHAR(255)", false, false);
        assert_eq!(resolver.resolve(&col).jdbc_type, JdbcType::VarChar);
        assert_eq!(java(&resolver, "TEXT"), "java.lang.String");
        assert_eq!(java(&resolver, "BLOB"), "byte[]");
        assert!(resolver.resolve(&make_column("b", "BLOB", true, false)).java_type.is_array());
    }

    #[test]
    fn test_datetime_types() {
        let modern = TypeResolver::new(true);
        assert_eq!(java(&modern, "DATETIME"), "java.time.LocalDateTime");
        assert_eq!(java(&modern, "DATE"), "java.time.LocalDate");
        assert_eq!(java(&modern, "TIME"), "java.time.LocalTime");

        let legacy = TypeResolver::new(false);
        assert_eq!(java(&legacy, "TIMESTAMP"), "java.util.Date");
        assert_eq!(
            legacy.resolve(&make_column("t", "TIMESTAMP", true, false)).jdbc_type.name(),
            "TIMESTAMP"
        );
    }

    #[test]
    fn test_enum_type() {
        let resolver = TypeResolver::new(true);
        let mut col = make_column("status", "ENUM('ACTIVE','INACTIVE')", false, false);
        col.enum_values = Some(vec!["ACTIVE".to_string(), "INACTIVE".to_string()]);
        let resolved = resolver.resolve(&col);
        assert_eq!(resolved.jdbc_type, JdbcType::VarChar);
        assert_eq!(resolved.java_type.full_name(), "java.lang.String");
    }

    #[test]
    fn test_unknown_type() {
        let resolver = TypeResolver::new(true);
        let col = make_column("shape", "GEOMETRY", true, false);
        let resolved = resolver.resolve(&col);
        assert_eq!(resolved.jdbc_type.name(), "OTHER");
        assert_eq!(resolved.java_type.full_name(), "java.lang.Object");
    }
}
