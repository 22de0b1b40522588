use {
    asm::ast::Ast,
    isa::{Instruction, Program},
    rstest::rstest,
    rstest_reuse::{apply, template},
    std::path::PathBuf,
    vm::{mem, Cpu, Memory},
};

#[template]
#[rstest]
fn demos(#[files("demos/*.s")] path: PathBuf) {}

#[apply(demos)]
fn run_on_the_cpu(path: PathBuf) {
    let demo = Demo::from(path);
    let mut mem = Memory::new();
    mem.load(mem::BASE, &demo.program.to_bytes()).unwrap();
    let mut cpu = Cpu::new(mem, mem::BASE);
    let mut output = Vec::new();
    let exit = cpu.run(&mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), demo.expected_stdout);
    assert_eq!(exit.code, demo.expected_exit);
}

#[apply(demos)]
fn every_word_decodes(path: PathBuf) {
    let demo = Demo::from(path);
    for (index, &word) in demo.program.words.iter().enumerate() {
        let decoded = Instruction::decode(word);
        assert!(
            decoded.is_some(),
            "word {index} ({word:#010x}) does not decode"
        );
    }
}

struct Demo {
    program: Program,
    expected_stdout: String,
    expected_exit: u32,
}

impl From<PathBuf> for Demo {
    fn from(mut path: PathBuf) -> Self {
        let source = std::fs::read_to_string(&path).unwrap();
        let ast = Ast::try_from(&*source).unwrap();
        let program = Program::try_from(&ast).unwrap();

        path.set_extension("stdout");
        let expected_stdout = std::fs::read_to_string(&path).unwrap_or_default();

        path.set_extension("exit");
        let expected_exit = std::fs::read_to_string(&path)
            .map(|code| {
                code.trim()
                    .parse()
                    .unwrap_or_else(|e| panic!("bad exit code file at {path:?}: {e}"))
            })
            .unwrap_or_default();

        Demo {
            program,
            expected_stdout,
            expected_exit,
        }
    }
}
