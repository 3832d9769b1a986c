//! Custom section sub-dispatch.
//!
//! The payload of a custom section starts with a name. `name` and `dylink`
//! payloads have a structured grammar; any other payload is kept as an
//! opaque blob of its remaining declared size.
//!
//! When a structured payload fails to decode, [`PayloadPolicy::Lenient`]
//! rewinds to the start of the payload and keeps it as a blob instead,
//! registering nothing from it.

use binscope_error::{Error, ErrorKind, Result};
use binscope_format::binary::{NAME_FUNCTION, NAME_LOCAL, NAME_MODULE};
use log::{trace, warn};

use crate::{
    decoder::Decoder,
    node::{NodeBuilder, NodePath},
    options::PayloadPolicy,
    registry::{Entity, Space, SpaceKey},
};

/// Custom payloads with a structured grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structured {
    Names,
    Dylink,
}

impl Structured {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Names),
            "dylink" => Some(Self::Dylink),
            _ => None,
        }
    }
}

pub(super) fn decode_custom_section(
    d: &mut Decoder<'_>,
    record: &mut NodeBuilder,
    at: &NodePath,
    payload_end: usize,
) -> Result<()> {
    let name = d.name_field(record, "name")?;
    record.set_name(format!("custom section: {}", name));
    if d.position() >= payload_end {
        return Ok(());
    }

    let Some(structured) = Structured::from_name(name) else {
        trace!("Custom section {:?} kept opaque", name);
        return contents(d, record, payload_end);
    };
    trace!("Custom section {:?} decoded as {:?}", name, structured);

    let checkpoint = d.checkpoint();
    let base = record.len();
    let start = d.position();
    let result = match structured {
        Structured::Names => name_payload(d, record, at, payload_end),
        Structured::Dylink => dylink_payload(d, record).map(|()| Vec::new()),
    }
    .and_then(|names| {
        d.reconcile((payload_end - start) as u64, start)?;
        Ok(names)
    });

    match result {
        Ok(names) => {
            for entity in names {
                d.record(SpaceKey::module(Space::FunctionNames), entity);
            }
            Ok(())
        },
        Err(error) if d.options().payload_policy == PayloadPolicy::Lenient => {
            warn!("Malformed {:?} custom section kept as raw bytes: {}", name, error);
            d.restore(checkpoint);
            record.truncate(base);
            contents(d, record, payload_end)
        },
        Err(error) => Err(error),
    }
}

fn contents(d: &mut Decoder<'_>, record: &mut NodeBuilder, payload_end: usize) -> Result<()> {
    let len = payload_end.saturating_sub(d.position());
    if len > 0 {
        d.bytes_field(record, "contents", len)?;
    }
    Ok(())
}

/// Decode the subsections of a `name` payload, returning the function name
/// associations to register once the whole payload is known to be valid.
fn name_payload(
    d: &mut Decoder<'_>,
    record: &mut NodeBuilder,
    at: &NodePath,
    payload_end: usize,
) -> Result<Vec<Entity>> {
    let mut names = Vec::new();
    while d.position() < payload_end {
        let path = at.child(record.len());
        let mut subsection = d.begin("subsection");
        let id = d.u8_field(&mut subsection, "subID")?;
        let size = d.u32_field(&mut subsection, "size")?;
        let p0 = d.position();
        if p0 + size as usize > payload_end {
            return Err(Error::new(
                ErrorKind::SizeMismatch { declared: u64::from(size), actual: payload_end.saturating_sub(p0) as u64 },
                p0,
            ));
        }

        d.bounded(p0 + size as usize, |d| {
            match id {
                NAME_MODULE => {
                    subsection.set_description("module name");
                    d.name_field(&mut subsection, "name")?;
                },
                NAME_FUNCTION => {
                    subsection.set_description("function names");
                    let vector = d.vector("function names", &path.child(subsection.len()), |d, _, path| {
                        let mut assoc = d.begin("name");
                        let idx = d.u32_field(&mut assoc, "idx")?;
                        let name = d.name_field(&mut assoc, "name")?;
                        assoc.set_name(format!("#{}", idx));
                        assoc.set_description(format!("{}()", name));
                        names.push(Entity::local(path.clone()).with_value(u64::from(idx)).with_text(name));
                        Ok(d.finish(assoc))
                    })?;
                    subsection.push(vector);
                },
                _ => {
                    subsection.set_description(if id == NAME_LOCAL { "local names" } else { "unknown" });
                    d.bytes_field(&mut subsection, "contents", size as usize)?;
                },
            }
            Ok(())
        })?;
        d.reconcile(u64::from(size), p0)?;
        record.push(d.finish(subsection));
    }
    Ok(names)
}

fn dylink_payload(d: &mut Decoder<'_>, record: &mut NodeBuilder) -> Result<()> {
    d.u32_field(record, "memorySize")?;
    d.u32_field(record, "memoryAlignment")?;
    d.u32_field(record, "tableSize")?;
    d.u32_field(record, "tableAlignment")?;
    Ok(())
}
