//! End-to-end tests from source text to assembly text

use indoc::indoc;
use mcc_codegen::{compile_to_assembly, compile_with_options, CodegenOptions};
use mcc_common::ErrorKind;
use pretty_assertions::assert_eq;

const PRELUDE: &str = indoc! {r#"
    	.data
    .Lprint_fmt:
    	.asciz "%ld\n"
    	.text
    print:
    	push %rbx
    	mov %rdi, %rbx
    	mov %rdi, %rsi
    	lea .Lprint_fmt(%rip), %rdi
    	xor %eax, %eax
    	call printf
    	mov %rbx, %rax
    	pop %rbx
    	ret
"#};

const STACK_NOTE: &str = "\t.section .note.GNU-stack,\"\",@progbits\n";

fn compile(source: &str) -> String {
    compile_to_assembly(source, "test.c").unwrap().assembly
}

/// The assembly of the functions alone
fn body(source: &str) -> String {
    let assembly = compile(source);
    let rest = assembly.strip_prefix(PRELUDE).expect("prelude comes first");
    rest.strip_suffix(STACK_NOTE).expect("stack note comes last").to_string()
}

fn lines_after<'a>(assembly: &'a str, line: &str) -> Vec<&'a str> {
    assembly.lines().skip_while(|l| *l != line).skip(1).collect()
}

#[test]
fn test_print_constant() {
    assert_eq!(
        body("int main() { print 7; }"),
        indoc! {"
            	.text
            	.globl main
            main:
            	push %rbp
            	mov %rsp, %rbp
            	sub $8, %rsp
            	mov $7, %r8
            	mov %r8, %rdi
            	push %rbx
            	call print
            	pop %rbx
            	mov %rax, %r8
            	mov $0, %rax
            .L0:
            	mov %rbp, %rsp
            	pop %rbp
            	ret
        "}
    );
}

#[test]
fn test_counting_loop() {
    assert_eq!(
        body("int main(){ int i; for (i=0;i<3;i=i+1) print i; }"),
        indoc! {"
            	.text
            	.globl main
            main:
            	push %rbp
            	mov %rsp, %rbp
            	sub $24, %rsp
            	mov $0, %r8
            	mov %r8d, -8(%rbp)
            .L1:
            	movslq -8(%rbp), %r8
            	mov $3, %r9
            	cmp %r9, %r8
            	setl %r8b
            	movzbq %r8b, %r8
            	cmp $0, %r8
            	je .L2
            	movslq -8(%rbp), %r8
            	mov %r8, %rdi
            	push %rbx
            	call print
            	pop %rbx
            	mov %rax, %r8
            	movslq -8(%rbp), %r8
            	mov $1, %r9
            	add %r9, %r8
            	movslq %r8d, %r8
            	mov %r8d, -8(%rbp)
            	jmp .L1
            .L2:
            	mov $0, %rax
            .L0:
            	mov %rbp, %rsp
            	pop %rbp
            	ret
        "}
    );
}

#[test]
fn test_global_if_else() {
    let source = "int x; int main(){ x = 3; if (x > 1) print x; else print 0; }";
    let assembly = compile(source);

    assert!(assembly.contains("\t.comm x, 8, 8\n"));
    assert!(assembly.contains("\tmov %r8d, x(%rip)\n"));
    assert!(assembly.contains("\tmovslq x(%rip), %r8\n"));
    assert!(assembly.contains("\tsetg %r8b\n"));
    assert!(assembly.contains("\tje .L1\n\tmovslq x(%rip), %r8\n"));
    assert!(assembly.contains("\tjmp .L2\n.L1:\n\tmov $0, %r8\n"));
}

#[test]
fn test_generation_is_deterministic() {
    let source = indoc! {r#"
        char *greeting = "hi";
        long total;
        int add(int a, int b) { return a + b; }
        int main() {
            int i;
            for (i = 0; i < 10; i = i + 1) {
                if (i == 5) break;
                total = add(total, i);
            }
            print total;
            return 0;
        }
    "#};
    assert_eq!(compile(source), compile(source));
}

#[test]
fn test_loop_without_break_has_no_exit_label() {
    let assembly = compile("int main() { for (;;) { print 1; } }");
    assert_eq!(
        lines_after(&assembly, "\tjmp .L1"),
        vec!["\tmov $0, %rax", ".L0:", "\tmov %rbp, %rsp", "\tpop %rbp", "\tret", STACK_NOTE.trim_end()]
    );
}

#[test]
fn test_break_in_infinite_loop_allocates_exit_label() {
    let assembly = compile("int main() { for (;;) { break; } }");
    assert!(assembly.contains(".L1:\n\tjmp .L2\n\tjmp .L1\n.L2:\n"));
}

#[test]
fn test_nested_break_targets_inner_loop() {
    let source = indoc! {"
        int main() {
            int i;
            int j;
            for (i = 0; i < 2; i = i + 1)
                for (j = 0; j < 2; j = j + 1)
                    break;
        }
    "};
    let assembly = compile(source);

    // outer loop .L1/.L2, inner loop .L3/.L4
    assert!(assembly.contains("\tje .L4\n\tjmp .L4\n"));
    assert!(assembly.contains("\tjmp .L3\n.L4:\n"));
    assert!(assembly.contains("\tjmp .L1\n.L2:\n"));
}

#[test]
fn test_do_while_continue_without_break() {
    let source = indoc! {"
        int main() {
            int i;
            i = 0;
            do {
                i = i + 1;
                if (i < 3) continue;
                print i;
            } while (i < 5);
        }
    "};
    let assembly = compile(source);

    assert!(assembly.contains("\tje .L2\n\tjmp .L1\n.L2:\n"));
    assert_eq!(
        lines_after(&assembly, "\tjne .L1").first(),
        Some(&"\tmov $0, %rax")
    );
}

#[test]
fn test_while_with_continue_jumps_to_condition() {
    let assembly = compile("int main() { int i; i = 0; while (i < 3) { i = i + 1; continue; } }");
    assert!(assembly.contains("\tmov %r8d, -8(%rbp)\n\tjmp .L1\n\tjmp .L1\n.L2:\n"));
}

#[test]
fn test_for_continue_runs_post_expression() {
    let source = indoc! {"
        int main() {
            int i;
            for (i = 0; i < 3; i = i + 1) {
                if (i == 1) continue;
                print i;
            }
        }
    "};
    let assembly = compile(source);

    // .L1 condition, .L2 exit, .L3 end of the if, .L4 continue
    assert!(assembly.contains("\tjmp .L4\n"));
    assert!(assembly.contains(".L4:\n\tmovslq -8(%rbp), %r8\n\tmov $1, %r9\n\tadd"));
    assert!(assembly.contains("\tadd %r9, %r8\n\tmovslq %r8d, %r8\n\tmov %r8d, -8(%rbp)\n\tjmp .L1\n.L2:\n"));
}

#[test]
fn test_for_without_continue_has_no_continue_label() {
    let source = indoc! {"
        int main() {
            int i;
            for (i = 0; i < 3; i = i + 1) {
                if (i == 1) print 0;
                print i;
            }
        }
    "};
    let assembly = compile(source);
    assert!(!assembly.contains(".L4"));

    let lines: Vec<&str> = assembly.lines().collect();
    let post = lines
        .windows(2)
        .position(|pair| pair == ["\tmovslq -8(%rbp), %r8", "\tmov $1, %r9"])
        .expect("post expression is generated");
    assert!(!lines[post - 1].ends_with(':'));
}

#[test]
fn test_parameters_spill_to_frame() {
    let source = "long pick(char c, long l, int *p) { return l; } int main() { return pick(1, 2, 0); }";
    let assembly = compile(source);

    assert!(assembly.contains("\tsub $40, %rsp\n\tmov %dil, -8(%rbp)\n\tmov %rsi, -16(%rbp)\n\tmov %rdx, -24(%rbp)\n"));
    assert!(assembly.contains("\tmov -16(%rbp), %r8\n\tmov %r8, %rax\n\tjmp .L0\n"));
}

#[test]
fn test_call_arguments_and_alignment() {
    let source = "int add(int a, int b) { return a + b; } int main() { return add(1, 2); }";
    let assembly = compile(source);

    // the parked argument is popped again before the call, so it is padded
    assert!(assembly.contains(concat!(
        "\tmov $1, %r8\n",
        "\tpush %r8\n",
        "\tmov $2, %r8\n",
        "\tmov %r8, %rsi\n",
        "\tpop %rdi\n",
        "\tsub $8, %rsp\n",
        "\tcall add\n",
        "\tadd $8, %rsp\n",
        "\tmov %rax, %r8\n",
    )));
}

#[test]
fn test_live_registers_are_saved_around_calls() {
    let source = "int one() { return 1; } int main() { return 2 + one(); }";
    let assembly = compile(source);

    assert!(assembly.contains(concat!(
        "\tmov $2, %r8\n",
        "\tpush %r8\n",
        "\tcall one\n",
        "\tpop %r8\n",
        "\tmov %rax, %r9\n",
        "\tadd %r9, %r8\n",
    )));
}

#[test]
fn test_even_pushes_are_padded() {
    let source = "int one() { return 1; } int main() { return one(); }";
    let assembly = compile(source);
    assert!(assembly.contains("\tsub $8, %rsp\n\tcall one\n\tadd $8, %rsp\n"));
}

#[test]
fn test_pointer_arithmetic_scales() {
    let source = "long a[4]; int main() { long *p; p = a; print *(p + 2); return a[3]; }";
    let assembly = compile(source);

    assert!(assembly.contains("\t.comm a, 32, 8\n"));
    assert!(assembly.contains("\tlea a(%rip), %r8\n\tmov %r8, -8(%rbp)\n"));
    assert!(assembly.contains("\tmov $2, %r9\n\timul $8, %r9\n\tadd %r9, %r8\n\tmov (%r8), %r8\n"));
    assert!(assembly.contains("\tlea a(%rip), %r8\n\tmov $3, %r9\n\timul $8, %r9\n\tadd %r9, %r8\n\tmov (%r8), %r8\n"));
}

#[test]
fn test_pointer_difference_divides_by_element_size() {
    let source = "int main() { int a[4]; int *p; int *q; p = a; q = p + 3; print q - p; }";
    let assembly = compile(source);
    assert!(assembly.contains(concat!(
        "\tsub %r9, %r8\n",
        "\tmov $4, %rcx\n",
        "\tmov %r8, %rax\n",
        "\tcqo\n",
        "\tidiv %rcx\n",
        "\tmov %rax, %r8\n",
    )));
}

#[test]
fn test_unsigned_division_and_comparison() {
    let source = "unsigned int u; int main() { u = 10; print u / 3; print u < 20; }";
    let assembly = compile(source);

    assert!(assembly.contains("\tmov u(%rip), %r8d\n"));
    assert!(assembly.contains("\txor %edx, %edx\n\tdiv %r9\n"));
    assert!(assembly.contains("\tmov %r8d, %r8d\n"));
    assert!(assembly.contains("\tsetb %r8b\n"));
}

#[test]
fn test_char_values_are_sign_extended() {
    let assembly = compile("int main() { char c; c = 200; print c; }");
    assert!(assembly.contains("\tmov $200, %r8\n\tmovsbq %r8b, %r8\n\tmov %r8b, -8(%rbp)\n"));
    assert!(assembly.contains("\tmovsbq -8(%rbp), %r8\n"));
}

#[test]
fn test_large_constant_uses_movabs() {
    let assembly = compile("long big; int main() { big = 4294967296; }");
    assert!(assembly.contains("\tmovabs $4294967296, %r8\n\tmov %r8, big(%rip)\n"));
}

#[test]
fn test_logical_and_short_circuits() {
    let assembly = compile("int main() { int a; int b; print a && b; }");
    assert!(assembly.contains(indoc! {"
        	movslq -8(%rbp), %r8
        	cmp $0, %r8
        	je .L1
        	movslq -16(%rbp), %r8
        	cmp $0, %r8
        	je .L1
        	mov $1, %r8
        	jmp .L2
        .L1:
        	mov $0, %r8
        .L2:
    "}));
}

#[test]
fn test_string_literals_and_initialized_globals() {
    let source = r#"char *s = "hi\n"; long n = 5; int main() { char *t; t = "ok"; print n; }"#;
    let assembly = compile(source);

    assert!(assembly.contains("\t.data\n\t.globl s\n\t.align 8\ns:\n\t.quad .LS0\n"));
    assert!(assembly.contains("\t.globl n\n\t.align 8\nn:\n\t.quad 5\n"));
    assert!(assembly.contains("\tlea .LS2(%rip), %r8\n"));
    assert!(assembly.contains("\t.section .rodata\n.LS0:\n\t.asciz \"hi\\n\"\n.LS2:\n\t.asciz \"ok\"\n"));
}

#[test]
fn test_expression_too_complex() {
    let err = compile_to_assembly("int main() { print 1+(1+(1+(1+(1+1)))); }", "deep.c").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Source);
    assert!(err.to_string().starts_with("deep.c:1:"));
    assert!(err.to_string().ends_with("error: expression too complex"));
}

#[test]
fn test_left_nested_chain_reuses_registers() {
    let chain = vec!["1"; 40].join(" + ");
    let assembly = compile(&format!("int main() {{ print {chain}; }}"));
    assert!(!assembly.contains("%r10"));
}

#[test]
fn test_break_outside_loop() {
    let err = compile_to_assembly("int main() {\n    break;\n}", "b.c").unwrap_err();
    assert_eq!(err.to_string(), "b.c:2:5: error: break statement not within a loop");
}

#[test]
fn test_source_errors_produce_no_assembly() {
    assert!(compile_to_assembly("int main() { print y; }", "u.c").is_err());
    assert!(compile_to_assembly("int g; int g; int main() { }", "r.c").is_err());
}

#[test]
fn test_warnings_are_returned_with_assembly() {
    let compiled = compile_to_assembly("int f() { } int main() { return f(); }", "w.c").unwrap();
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(
        compiled.warnings[0].message,
        "control reaches end of non-void function"
    );
}

#[test]
fn test_comments_name_functions() {
    let options = CodegenOptions { emit_comments: true };
    let compiled = compile_with_options("int main() { }", "c.c", options).unwrap();
    assert!(compiled.assembly.contains("\t# function main\n\t.text\n"));
}
