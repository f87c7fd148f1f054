use std::panic;

use glyphxml::{parse, parse_dtd, ContentModelNode};

const CASES: usize = 300;
const MAX_LEN: usize = 384;
const CHARSET: &[u8] = b"abcxyz019 \n\t<>/=\"'?!-[]()|,*+#&;:.\0";
const FRAGMENTS: &[&str] = &[
    "<a>", "</a>", "<b/>", "<!--", "-->", "<?xml ", "?>", "<!DOCTYPE a ", "[", "]", "<!ELEMENT a ",
    "(b|c)*", "(x,y?)", "<![CDATA[", "]]>", "&amp;", "&lt", "&#163;", " k=\"v\"", "\"", "text",
];

#[test]
fn parser_never_panics_on_random_bytes() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x5eed_1a2b_3c4d_5e6f);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source = random_bytes(&mut rng, len);
        let result = panic::catch_unwind(|| {
            let _ = parse(&source);
            let _ = parse_dtd(&source);
        });
        if result.is_err() {
            return Err(format!("parse panicked for case {}: {:?}", case, source).into());
        }
    }
    Ok(())
}

#[test]
fn parser_never_panics_on_markup_fragments() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x0ddb_a11c_afe5_eed5);
    for case in 0..CASES {
        let count = rng.gen_range(0, 24);
        let mut source = String::new();
        for _ in 0..count {
            source.push_str(FRAGMENTS[rng.gen_range(0, FRAGMENTS.len())]);
        }
        let result = panic::catch_unwind(|| parse(source.as_bytes()).map(|doc| doc.to_string()));
        match result {
            Err(_) => return Err(format!("parse panicked for case {}: {:?}", case, source).into()),
            Ok(Ok(written)) => {
                if parse(written.as_bytes()).is_err() {
                    return Err(format!(
                        "written output of case {} does not reparse\nSource:\n{}\nWritten:\n{}",
                        case, source, written
                    )
                    .into());
                }
            }
            Ok(Err(_)) => {}
        }
    }
    Ok(())
}

#[test]
fn wide_encodings_never_panic() -> Result<(), Box<dyn std::error::Error>> {
    let boms: [&[u8]; 4] = [
        &[0xFF, 0xFE],
        &[0xFE, 0xFF],
        &[0xFF, 0xFE, 0x00, 0x00],
        &[0x00, 0x00, 0xFE, 0xFF],
    ];
    let mut rng = Lcg::new(0x1234_5678_9abc_def0);
    for case in 0..CASES {
        let mut source = boms[case % boms.len()].to_vec();
        let len = rng.gen_range(0, MAX_LEN + 1);
        source.extend(random_bytes(&mut rng, len));
        if panic::catch_unwind(|| parse(&source)).is_err() {
            return Err(format!("parse panicked for case {}: {:?}", case, source).into());
        }
    }
    Ok(())
}

const MODEL_ALPHABET: &[u8] = b"ab(),|*+? ";

#[test]
fn content_model_never_panics() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0xfeed_face_dead_beef);
    for case in 0..CASES {
        let len = rng.gen_range(0, 32);
        let model: String = (0..len)
            .map(|_| MODEL_ALPHABET[rng.gen_range(0, MODEL_ALPHABET.len())] as char)
            .collect();
        let result = panic::catch_unwind(|| {
            if let Ok(node) = ContentModelNode::parse(&model) {
                let _ = node.is_array("a");
                let _ = node.modifier_of("b");
            }
        });
        if result.is_err() {
            return Err(format!("content model panicked for case {}: {:?}", case, model).into());
        }
    }
    Ok(())
}

fn random_bytes(rng: &mut Lcg, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0, CHARSET.len());
            CHARSET.get(idx).copied().unwrap_or(b' ')
        })
        .collect()
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn gen_range(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        let span = max - min;
        let value = (self.next() >> 1) as usize;
        min + (value % span)
    }
}
