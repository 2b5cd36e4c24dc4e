//! Function definition regions used for code folding.

use luma_yellow::SyntaxKind::*;
use luma_yellow::ast::{AstNode as _, FunctionDef};
use luma_yellow::{SyntaxNode, SyntaxTree};
use text_size::{TextRange, TextSize};

/// A foldable span covering one function definition, from its first keyword
/// through the closing `end`. Anonymous functions have an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FoldRegion {
    pub name: String,
    pub range: TextRange,
}

impl FoldRegion {
    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// Collects regions in depth-first pre-order: a definition comes before the
/// definitions nested in it, and earlier siblings come first.
pub fn extract(tree: &SyntaxTree) -> Vec<FoldRegion> {
    collect(vec![tree.root()], Vec::new())
}

/// Parses `text` and extracts its regions.
pub fn fold_regions(text: &str) -> Vec<FoldRegion> {
    let parse = luma_parse::parse(text);
    extract(parse.tree())
}

/// Walks with an explicit stack: left-associative chains nest as deep as
/// they are long.
fn collect(mut pending: Vec<SyntaxNode<'_>>, mut regions: Vec<FoldRegion>) -> Vec<FoldRegion> {
    while let Some(node) = pending.pop() {
        match node.kind() {
            FUNCTION_STMT | LOCAL_FUNCTION_STMT | FUNCTION_EXPR => {
                // A body cut short by the end of input has no meaningful end.
                if let Some(def) = FunctionDef::cast(node)
                    && def.is_closed()
                {
                    let name = def.name().unwrap_or_default();
                    regions.push(FoldRegion { name, range: def.range() });
                }
            }
            _ => {}
        }

        let first_child = pending.len();
        pending.extend(node.children());
        pending[first_child..].reverse();
    }

    regions
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    fn check_offsets(text: &str, regions: &[FoldRegion]) {
        for region in regions {
            assert!(region.start() < region.end(), "{region:?}");
            assert!(usize::from(region.end()) <= text.len(), "{region:?}");

            let slice = &text[region.range];
            assert!(
                slice.starts_with("function") || slice.starts_with("local function"),
                "{slice:?}"
            );
            assert!(slice.ends_with("end"), "{slice:?}");
        }
    }

    #[test]
    fn same_text_same_regions() {
        let text = "local function a() end\nfunction b.c() return function() end end\n";
        assert_eq!(fold_regions(text), fold_regions(text));
    }

    #[test]
    fn empty_input() {
        assert_eq!(fold_regions(""), []);
    }

    #[test]
    fn no_functions() {
        assert_eq!(fold_regions("x = 1 + 2"), []);
    }

    #[test]
    fn single_top_level_function() {
        let text = "function foo() return 1 end";
        let regions = fold_regions(text);

        assert_eq!(
            regions,
            [FoldRegion { name: "foo".to_owned(), range: TextRange::new(0.into(), 27.into()) }]
        );
        assert_eq!(usize::from(regions[0].end()), text.len());
        check_offsets(text, &regions);
    }

    #[test]
    fn nested_functions_outer_first() {
        let text = "function outer() function inner() end end";
        let regions = fold_regions(text);

        let names: Vec<_> = regions.iter().map(|region| region.name.as_str()).collect();
        assert_eq!(names, ["outer", "inner"]);

        let (outer, inner) = (&regions[0], &regions[1]);
        assert!(outer.start() <= inner.start());
        assert!(inner.end() <= outer.end());
        assert_eq!(&text[inner.range], "function inner() end");
        check_offsets(text, &regions);
    }

    #[test]
    fn anonymous_function_has_empty_name() {
        let text = "local f = function() end";
        let regions = fold_regions(text);

        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_anonymous());
        assert_eq!(&text[regions[0].range], "function() end");
    }

    #[test]
    fn unclosed_function_has_no_region() {
        assert_eq!(fold_regions("function foo() return 1"), []);
    }

    #[test]
    fn unclosed_outer_keeps_closed_inner() {
        let text = "function outer()\n  local function inner() end\n";
        let regions = fold_regions(text);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "inner");
        assert_eq!(&text[regions[0].range], "local function inner() end");
    }

    #[test]
    fn all_three_forms_in_order() {
        let text = r#"-- module
local M = {}

function M.new(opts)
  local self = setmetatable({}, M)
  self.cb = function(x) return x end
  return self
end

function M:run() end

local function helper(...)
  -- trailing comment
end
"#;
        let regions = fold_regions(text);
        let names: Vec<_> = regions.iter().map(|region| region.name.as_str()).collect();

        assert_eq!(names, ["M.new", "", "M:run", "helper"]);
        check_offsets(text, &regions);
        assert!(text[regions[3].range].ends_with("comment\nend"));
    }

    #[test]
    fn offsets_are_utf8_bytes() {
        let text = "s = 'héllo'\nfunction ü() end";
        let regions = fold_regions(text);

        // `ü` is not an identifier character, so the name is empty and an
        // error is reported, but the region still spans the whole definition.
        assert_eq!(regions.len(), 1);
        assert_eq!(usize::from(regions[0].start()), "s = 'héllo'\n".len());
        assert_eq!(usize::from(regions[0].end()), text.len());
    }

    #[test]
    fn regions_follow_function_definitions() {
        let text = "t = { a = function() end, b = { c = function() end } }\nf(function() end)";
        let regions = fold_regions(text);

        assert_eq!(regions.len(), 3);
        assert!(regions.windows(2).all(|pair| pair[0].start() < pair[1].start()));
        check_offsets(text, &regions);
    }

    #[test]
    fn callbacks_in_a_script() {
        let text = r#"wifi.setmode(wifi.STATION)

local function connect(ssid, pwd)
  wifi.sta.config({ ssid = ssid, pwd = pwd })
  tmr.alarm(0, 1000, tmr.ALARM_AUTO, function()
    if wifi.sta.getip() then
      tmr.stop(0)
    end
  end)
end

srv = net.createServer(net.TCP)
srv:listen(80, function(conn)
  conn:on("receive", function(sck, req) sck:send("ok") end)
end)
"#;
        let actual: String = fold_regions(text)
            .iter()
            .map(|region| format!("{:?} {:?}\n", region.name, region.range))
            .collect();

        expect![[r#"
            "connect" 28..221
            "" 145..216
            "" 270..348
            "" 306..343
        "#]]
        .assert_eq(&actual);
    }

    #[test]
    fn deep_parentheses_are_cut_off() {
        const DEPTH: usize = 200_000;
        let text =
            format!("x = {}1{}\nlocal function after() end", "(".repeat(DEPTH), ")".repeat(DEPTH));
        let regions = fold_regions(&text);

        let names: Vec<_> = regions.iter().map(|region| region.name.as_str()).collect();
        assert_eq!(names, ["after"]);
        check_offsets(&text, &regions);
    }

    #[test]
    fn callback_at_the_bottom_of_a_long_chain() {
        let text = format!("x = f(function() end){}", " + 1".repeat(50_000));
        let regions = fold_regions(&text);

        assert_eq!(
            regions,
            [FoldRegion { name: String::new(), range: TextRange::new(6.into(), 20.into()) }]
        );
    }
}
