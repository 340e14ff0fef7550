//! Binding maps onto struct fields.
//!
//! The derive macros in `recast-derive` emit a static [`Field`] table per
//! struct; [`Map::to_in`] walks that table, resolves each field's candidate
//! keys, and assigns the converted values. Options on the
//! [`Context`](crate::Context) control fallback keys, missing-field
//! handling, and error aggregation.

use tracing::debug;

use crate::convert::Context;
use crate::error::Error;
use crate::map::Map;
use crate::value::Value;

/// One bindable field of a destination struct.
pub struct Field<D> {
    /// The field's name in the source struct.
    pub name: &'static str,
    /// Tag-provided lookup keys, in priority order.
    pub keys: &'static [&'static str],
    /// Field opted out of binding (empty tag).
    pub skip: bool,
    /// Whether a tag was present at all.
    pub tagged: bool,
    /// Converts `Value` and writes it into the field.
    pub assign: fn(&mut D, &Value, &Context<'_>) -> Result<(), Error>,
}

/// Struct types a [`Map`] can bind onto.
///
/// Usually derived; a manual impl supplies one [`Field`] per bindable field.
/// The `'static` bound lets generic callers borrow the field table.
pub trait FromMap: Sized + 'static {
    fn fields() -> &'static [Field<Self>];
}

/// Struct types that can render themselves as a [`Map`], keyed by field
/// name. Usually derived.
pub trait ToMap {
    fn to_map(&self) -> Map;
}

impl<T: ToMap> From<&T> for Map {
    fn from(value: &T) -> Self {
        value.to_map()
    }
}

impl Map {
    /// Bind this map onto `dest` with the default context.
    pub fn to<D: FromMap>(&self, dest: &mut D) -> Result<(), Error> {
        self.to_in(dest, &Context::new())
    }

    /// Bind this map onto `dest`.
    ///
    /// For every non-skipped field the candidate keys are assembled from the
    /// tag and the options, resolved with [`Map::get_first`], and assigned.
    /// Failures abort at the first field unless `collect_errors` is set, in
    /// which case they aggregate into one error at the end.
    pub fn to_in<D: FromMap>(&self, dest: &mut D, ctx: &Context<'_>) -> Result<(), Error> {
        let options = ctx.options();
        let mut collected = Vec::new();
        for field in D::fields() {
            if field.skip {
                continue;
            }
            let mut keys: Vec<&str> = Vec::new();
            if field.tagged {
                keys.extend_from_slice(field.keys);
                if options.append_field_name {
                    keys.push(field.name);
                }
            } else if options.skip_untagged {
                continue;
            } else if options.field_name_fallback {
                keys.push(field.name);
            }
            if keys.is_empty() {
                let err = Error::NoKeys {
                    field: field.name.to_owned(),
                };
                if options.collect_errors {
                    collected.push(err);
                    continue;
                }
                return Err(err);
            }
            let outcome = match self.get_first(keys.iter().copied()) {
                Ok(value) => {
                    debug!(field = field.name, kind = %value.kind(), "binding field");
                    (field.assign)(dest, &value, ctx)
                        .map_err(|err| Error::field(field.name, err))
                }
                Err(Error::NoValidKey { .. }) if options.ignore_missing => Ok(()),
                Err(err) => Err(Error::field(field.name, err)),
            };
            if let Err(err) = outcome {
                if options.collect_errors {
                    collected.push(err);
                } else {
                    return Err(err);
                }
            }
        }
        if collected.is_empty() {
            Ok(())
        } else {
            Err(Error::join(collected))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ToOptions;
    use crate::value::Data;

    #[derive(Debug, Default, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        tags: Vec<String>,
    }

    // The table a `#[derive(FromMap)]` would emit, written out by hand:
    // `host` and `tags` untagged, `port` tagged with two candidate keys.
    impl FromMap for Server {
        fn fields() -> &'static [Field<Self>] {
            static FIELDS: &[Field<Server>] = &[
                Field {
                    name: "host",
                    keys: &[],
                    skip: false,
                    tagged: false,
                    assign: |dest, value, ctx| value.to_in(&mut dest.host, ctx),
                },
                Field {
                    name: "port",
                    keys: &["port", "listen_port"],
                    skip: false,
                    tagged: true,
                    assign: |dest, value, ctx| value.to_in(&mut dest.port, ctx),
                },
                Field {
                    name: "tags",
                    keys: &[],
                    skip: false,
                    tagged: false,
                    assign: |dest, value, ctx| value.to_in(&mut dest.tags, ctx),
                },
            ];
            FIELDS
        }
    }

    fn full_source() -> Map {
        Map::from([
            ("host", Data::from("localhost")),
            ("port", Data::from("8080")),
            ("tags", Data::from("a,b")),
        ])
    }

    // Same shape as `Map::to_in`: only the trait bound in scope.
    fn field_names<D: FromMap>() -> Vec<&'static str> {
        D::fields().iter().map(|field| field.name).collect()
    }

    #[test]
    fn field_tables_reachable_from_generic_code() {
        assert_eq!(field_names::<Server>(), ["host", "port", "tags"]);
        assert_eq!(field_names::<Renamed>(), ["port", "secret"]);
    }

    #[test]
    fn binds_by_name_and_tag() {
        let mut server = Server::default();
        full_source().to(&mut server).unwrap();
        assert_eq!(
            server,
            Server {
                host: "localhost".into(),
                port: 8080,
                tags: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn tag_keys_resolve_in_priority_order() {
        let mut source = full_source();
        source.remove("port");
        source.insert("listen_port", 9090i64);
        let mut server = Server::default();
        source.to(&mut server).unwrap();
        assert_eq!(server.port, 9090);

        // Both present: the first tag key wins.
        source.insert("port", 80i64);
        source.to(&mut server).unwrap();
        assert_eq!(server.port, 80);
    }

    #[test]
    fn missing_field_fails_with_field_context() {
        let mut source = full_source();
        source.remove("host");
        let err = source.to(&mut Server::default()).unwrap_err();
        match err {
            Error::Field { field, source } => {
                assert_eq!(field, "host");
                assert!(matches!(*source, Error::NoValidKey { .. }));
            }
            other => panic!("expected Field, got {other:?}"),
        }
    }

    #[test]
    fn ignore_missing_keeps_defaults() {
        let source = Map::from([("port", Data::from(81i64))]);
        let mut server = Server::default();
        let ctx = Context::new().with_options(ToOptions {
            ignore_missing: true,
            ..ToOptions::default()
        });
        source.to_in(&mut server, &ctx).unwrap();
        assert_eq!(server.port, 81);
        assert_eq!(server.host, "");
        assert!(server.tags.is_empty());
    }

    #[test]
    fn conversion_failure_names_the_field() {
        let mut source = full_source();
        source.insert("port", "not a number");
        let err = source.to(&mut Server::default()).unwrap_err();
        match err {
            Error::Field { field, source } => {
                assert_eq!(field, "port");
                assert!(matches!(*source, Error::Parse { .. }));
            }
            other => panic!("expected Field, got {other:?}"),
        }
    }

    #[test]
    fn collect_errors_aggregates() {
        let source = Map::from([("port", Data::from("bad"))]);
        let mut server = Server::default();
        let ctx = Context::new().with_options(ToOptions {
            collect_errors: true,
            ..ToOptions::default()
        });
        let err = source.to_in(&mut server, &ctx).unwrap_err();
        match err {
            // host missing, port unparseable, tags missing
            Error::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn skip_untagged_leaves_fields_alone() {
        let source = full_source();
        let mut server = Server::default();
        let ctx = Context::new().with_options(ToOptions {
            skip_untagged: true,
            ..ToOptions::default()
        });
        source.to_in(&mut server, &ctx).unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.host, "");
    }

    #[test]
    fn no_fallback_and_no_tag_is_an_error() {
        let source = full_source();
        let mut server = Server::default();
        let ctx = Context::new().with_options(ToOptions {
            field_name_fallback: false,
            ..ToOptions::default()
        });
        let err = source.to_in(&mut server, &ctx).unwrap_err();
        assert!(matches!(err, Error::NoKeys { field } if field == "host"));
    }

    #[derive(Debug, Default)]
    struct Renamed {
        port: u16,
        secret: String,
    }

    impl FromMap for Renamed {
        fn fields() -> &'static [Field<Self>] {
            static FIELDS: &[Field<Renamed>] = &[
                Field {
                    name: "port",
                    keys: &["primary"],
                    skip: false,
                    tagged: true,
                    assign: |dest, value, ctx| value.to_in(&mut dest.port, ctx),
                },
                Field {
                    name: "secret",
                    keys: &[],
                    skip: true,
                    tagged: true,
                    assign: |dest, value, ctx| value.to_in(&mut dest.secret, ctx),
                },
            ];
            FIELDS
        }
    }

    #[test]
    fn append_field_name_extends_tag_keys() {
        // The tag names only `primary`; the field's own name participates
        // just when appended.
        let source = Map::from([("port", Data::from(7i64))]);
        assert!(source.to(&mut Renamed::default()).is_err());

        let mut renamed = Renamed::default();
        let ctx = Context::new().with_options(ToOptions {
            append_field_name: true,
            ..ToOptions::default()
        });
        source.to_in(&mut renamed, &ctx).unwrap();
        assert_eq!(renamed.port, 7);
    }

    #[test]
    fn skipped_fields_stay_untouched() {
        let source = Map::from([
            ("primary", Data::from(1i64)),
            ("secret", Data::from("leaked")),
        ]);
        let mut renamed = Renamed::default();
        source.to(&mut renamed).unwrap();
        assert_eq!(renamed.port, 1);
        assert_eq!(renamed.secret, "");
    }
}
