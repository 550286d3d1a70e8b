// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Position map from generated program lines back to specification source.

use base64::Engine as _;
use serde::Serialize;

use crate::spec::Location;

/// Base64 alphabet of VLQ digits, per the [Source Map] revision 3
/// convention.
///
/// [Source Map]: https://sourcemaps.info/spec.html
const VLQ_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Ordered map from generated program lines to their originating
/// specification [`Location`]s.
#[derive(Clone, Debug, Default)]
pub struct CodeMap {
    /// Mapped lines, ordered by generated line number.
    entries: Vec<Entry>,
}

/// One mapped generated line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// 1-based line number in the generated program.
    pub generated_line: usize,

    /// Position of the originating unit in the specification source.
    pub location: Location,

    /// Name or text of the originating unit (feature, scenario or step).
    pub label: String,
}

/// [Source Map] revision 3 serialization of a [`CodeMap`].
///
/// [Source Map]: https://sourcemaps.info/spec.html
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    /// Always `3`.
    pub version: u8,

    /// Name of the generated file.
    pub file: String,

    /// The one specification source.
    pub sources: Vec<String>,

    /// Raw text of the specification source.
    pub sources_content: Vec<String>,

    /// Labels referenced by the `mappings` segments.
    pub names: Vec<String>,

    /// Base64-VLQ encoded segments, one per mapped generated line.
    pub mappings: String,
}

impl CodeMap {
    /// Records that the given 1-based `generated_line` originates at
    /// `location`.
    pub(crate) fn push(
        &mut self,
        generated_line: usize,
        location: Location,
        label: impl Into<String>,
    ) {
        self.entries.push(Entry {
            generated_line,
            location,
            label: label.into(),
        });
    }

    /// Mapped lines, ordered by generated line number.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Looks up the [`Entry`] mapping the given 1-based generated line, if
    /// that line is mapped.
    #[must_use]
    pub fn lookup(&self, generated_line: usize) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.generated_line == generated_line)
    }

    /// Serializes this [`CodeMap`] as a [`SourceMap`] for the generated
    /// `file`, naming the specification source `uri` with the given raw
    /// `content`.
    #[must_use]
    pub fn to_source_map(
        &self,
        file: &str,
        uri: &str,
        content: &str,
    ) -> SourceMap {
        let mut names = Vec::<String>::new();
        let mut mappings = String::new();

        let mut prev_line = 0_i64;
        let mut prev_column = 0_i64;
        let mut prev_name = 0_i64;
        let mut generated = 1;

        for entry in &self.entries {
            if entry.generated_line == generated && !mappings.is_empty() {
                mappings.push(',');
            }
            for _ in generated..entry.generated_line {
                mappings.push(';');
            }
            generated = entry.generated_line;

            let name = names
                .iter()
                .position(|n| *n == entry.label)
                .unwrap_or_else(|| {
                    names.push(entry.label.clone());
                    names.len() - 1
                }) as i64;

            // Segment: generated column, source index, source line, source
            // column, name index. All but the first are relative.
            #[allow(clippy::cast_possible_wrap)]
            let line = entry.location.line as i64 - 1;
            #[allow(clippy::cast_possible_wrap)]
            let column = entry.location.column.unwrap_or(1) as i64 - 1;

            vlq(0, &mut mappings);
            vlq(0, &mut mappings);
            vlq(line - prev_line, &mut mappings);
            vlq(column - prev_column, &mut mappings);
            vlq(name - prev_name, &mut mappings);

            prev_line = line;
            prev_column = column;
            prev_name = name;
        }

        SourceMap {
            version: 3,
            file: file.to_owned(),
            sources: vec![uri.to_owned()],
            sources_content: vec![content.to_owned()],
            names,
            mappings,
        }
    }

    /// Renders this [`CodeMap`] as the trailing `sourceMappingURL` comment
    /// embedding the [`SourceMap`] as a base64 data URI.
    ///
    /// # Errors
    ///
    /// [`serde_json::Error`], if the [`SourceMap`] fails to serialize.
    pub fn to_comment(
        &self,
        file: &str,
        uri: &str,
        content: &str,
    ) -> Result<String, serde_json::Error> {
        let json =
            serde_json::to_string(&self.to_source_map(file, uri, content))?;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(json);
        Ok(format!(
            "//# sourceMappingURL=data:application/json;base64,{encoded}"
        ))
    }
}

/// Appends the base64-VLQ encoding of `value` to `out`.
fn vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (((-value) as u64) << 1_u8) | 1
    } else {
        (value as u64) << 1_u8
    };

    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5_u8;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(char::from(VLQ_ALPHABET[digit]));
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::{CodeMap, VLQ_ALPHABET};
    use crate::spec::Location;

    /// Decodes one `mappings` line back into segments of [`i64`] fields.
    fn decode_line(line: &str) -> Vec<Vec<i64>> {
        line.split(',')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let mut fields = Vec::new();
                let mut value = 0_u64;
                let mut shift = 0_u8;
                for c in segment.bytes() {
                    let digit = VLQ_ALPHABET
                        .iter()
                        .position(|a| *a == c)
                        .unwrap() as u64;
                    value |= (digit & 0b1_1111) << shift;
                    if digit & 0b10_0000 == 0 {
                        let signed = if value & 1 == 1 {
                            -((value >> 1_u8) as i64)
                        } else {
                            (value >> 1_u8) as i64
                        };
                        fields.push(signed);
                        value = 0;
                        shift = 0;
                    } else {
                        shift += 5;
                    }
                }
                fields
            })
            .collect()
    }

    fn map() -> CodeMap {
        let mut map = CodeMap::default();
        map.push(7, Location { line: 1, column: Some(1) }, "F");
        map.push(8, Location { line: 2, column: Some(3) }, "S");
        map.push(9, Location { line: 3, column: Some(5) }, "Given a");
        map.push(10, Location { line: 3, column: Some(5) }, "Given a");
        map
    }

    #[test]
    fn lookup_resolves_generated_lines() {
        let map = map();
        assert_eq!(map.lookup(8).unwrap().location.line, 2);
        assert_eq!(map.lookup(9).unwrap().label, "Given a");
        assert!(map.lookup(6).is_none());
    }

    #[test]
    fn source_map_decodes_back_to_the_entries() {
        let map = map();
        let sm = map.to_source_map("f.feature.js", "f.feature", "Feature: F");

        assert_eq!(sm.version, 3);
        assert_eq!(sm.sources, ["f.feature"]);
        assert_eq!(sm.names, ["F", "S", "Given a"]);

        let lines: Vec<_> = sm.mappings.split(';').collect();
        // Lines 1-6 are unmapped, 7-10 carry one segment each.
        assert_eq!(lines.len(), 10);
        assert!(lines[..6].iter().all(|l| l.is_empty()));

        let mut line = 0;
        let mut column = 0;
        let mut name = 0;
        let decoded: Vec<_> = lines
            .iter()
            .flat_map(|l| decode_line(l))
            .map(|segment| {
                line += segment[2];
                column += segment[3];
                name += segment[4];
                (line + 1, column + 1, name)
            })
            .collect();
        assert_eq!(
            decoded,
            [(1, 1, 0), (2, 3, 1), (3, 5, 2), (3, 5, 2)],
        );
    }

    #[test]
    fn comment_embeds_the_map_as_a_data_uri() {
        let comment = map()
            .to_comment("f.feature.js", "f.feature", "Feature: F")
            .unwrap();

        let encoded = comment
            .strip_prefix("//# sourceMappingURL=data:application/json;base64,")
            .unwrap();
        let json = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&json).unwrap();

        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "f.feature.js");
        assert_eq!(value["sourcesContent"][0], "Feature: F");
    }
}
