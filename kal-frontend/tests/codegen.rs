//! IR produced for complete programs

use kal_frontend::ir::Instruction;
use kal_frontend::{CodeGenerator, Frontend, Parser};
use pretty_assertions::assert_eq;

#[test]
fn test_function_ir_text() {
    let module = Frontend::compile_to_ir("def add(a b) a + b;", "m").unwrap();
    let add = module.get_function("add").unwrap();

    let expected = "\
define double @add(double %0, double %1) {
L0:
  %2 = alloca double
  %3 = alloca double
  store double %0, ptr %2
  store double %1, ptr %3
  %4 = load double, ptr %2
  %5 = load double, ptr %3
  %6 = fadd double %4, %5
  ret double %6
}
";
    assert_eq!(add.to_string(), expected);
}

#[test]
fn test_for_loop_blocks() {
    let module = Frontend::compile_to_ir(
        "extern putchard(c); def stars(n) for i = 0, i < n in putchard(42);",
        "m",
    )
    .unwrap();
    let stars = module.get_function("stars").unwrap();

    // entry, loop body, after
    assert_eq!(stars.blocks.len(), 3);
    let loop_block = &stars.blocks[1];
    assert!(matches!(
        loop_block.instructions.last(),
        Some(Instruction::BranchCond { true_label, .. }) if *true_label == loop_block.id
    ));
    assert!(matches!(
        stars.blocks[2].instructions.last(),
        Some(Instruction::Return(v)) if v.to_string() == "0.0"
    ));
}

#[test]
fn test_all_allocas_in_entry_block() {
    let module = Frontend::compile_to_ir(
        "def f(x) var a = 1, b = 2 in if x then (for i = 0, i < 3 in a = a + i) else b;",
        "m",
    )
    .unwrap();
    let f = module.get_function("f").unwrap();

    for block in &f.blocks[1..] {
        assert!(block
            .instructions
            .iter()
            .all(|inst| !matches!(inst, Instruction::Alloca { .. })));
    }
    let entry_allocas = f.blocks[0]
        .instructions
        .iter()
        .filter(|inst| matches!(inst, Instruction::Alloca { .. }))
        .count();
    // x, a, b, i
    assert_eq!(entry_allocas, 4);
}

#[test]
fn test_every_block_ends_in_terminator() {
    let module = Frontend::compile_to_ir(
        "def fib(n) if n < 3 then 1 else fib(n - 1) + fib(n - 2);
         def binary : 1 (x y) y;
         def seq(n) for i = 1, i < n in fib(i) : 0;",
        "m",
    )
    .unwrap();

    for function in module.definitions() {
        for block in &function.blocks {
            assert!(block.has_terminator(), "{} L{} lacks a terminator", function.name, block.id);
        }
    }
}

#[test]
fn test_generator_survives_errors() {
    let mut parser = Parser::from_text("def bad(x) y; def good(x) x * 2; good(4);");
    let mut codegen = CodeGenerator::new("session");

    let mut outcomes = Vec::new();
    loop {
        let unit = parser.parse_unit().unwrap();
        if unit.is_end_of_input() {
            break;
        }
        outcomes.push(codegen.lower_unit(&unit).is_ok());
    }

    assert_eq!(outcomes, vec![false, true, true]);
    assert!(codegen.module().get_function("bad").is_none());
    assert!(codegen.module().get_function("good").is_some());
}
